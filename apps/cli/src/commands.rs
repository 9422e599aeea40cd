//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};
use paramguard_core::{
    Constraint, ConstraintKind, ParameterContext, ParameterDataType, ParameterValidationResult,
    Setting, SettingRecord,
};
use serde::Deserialize;
use serde_json::json;

use crate::cli::TargetArgs;

/// Whether the checked values passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    fn from_failures(failures: usize) -> Self {
        if failures == 0 { Self::Passed } else { Self::Failed }
    }
}

/// Plain values never carry the encryption applied to stored ones.
fn without_encryption(constraints: &[Constraint]) -> Vec<Constraint> {
    constraints
        .iter()
        .filter(|c| !c.is(ConstraintKind::Encrypted))
        .cloned()
        .collect()
}

fn result_json(result: &ParameterValidationResult) -> serde_json::Value {
    json!({
        "member": result.member_name(),
        "message": result.message(),
        "message_id": result.message_id().map(|id| id.as_str()),
        "constraint": result.constraint().to_string(),
    })
}

pub fn parse(
    ctx: &ParameterContext,
    constraints: &str,
    data_type: ParameterDataType,
    as_json: bool,
) -> Result<Outcome> {
    let list = ctx
        .parser()
        .parse(constraints, data_type)
        .with_context(|| format!("cannot parse constraints for {data_type}"))?;

    if as_json {
        let items: Vec<_> = list
            .iter()
            .map(|c| json!({ "name": c.name(), "parameters": c.parameters() }))
            .collect();
        let report = json!({ "canonical": list.to_string(), "constraints": items });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{list}");
    }
    Ok(Outcome::Passed)
}

pub fn validate(
    ctx: &ParameterContext,
    value: &str,
    target: &TargetArgs,
    name: &str,
    display_name: Option<&str>,
    as_json: bool,
) -> Result<Outcome> {
    let constraints = ctx
        .parser()
        .parse(target.constraints.as_str(), target.data_type)
        .context("cannot parse constraints")?;
    let value = ctx
        .codec()
        .decode(value, target.data_type, &without_encryption(&constraints))
        .with_context(|| format!("'{value}' is not a valid {}", target.data_type))?;

    let results = ctx
        .validator()
        .validate(Some(&value), target.data_type, &constraints, name, display_name)?;
    paramguard_log::debug!(name, failures = results.len(), "validated value");

    if as_json {
        let report: Vec<_> = results.iter().map(result_json).collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for result in &results {
            println!("{}", result.message());
        }
    }
    Ok(Outcome::from_failures(results.len()))
}

pub fn encode(ctx: &ParameterContext, value: &str, target: &TargetArgs) -> Result<Outcome> {
    let constraints = ctx
        .parser()
        .parse(target.constraints.as_str(), target.data_type)
        .context("cannot parse constraints")?;
    let plain = ctx
        .codec()
        .decode(value, target.data_type, &without_encryption(&constraints))
        .with_context(|| format!("'{value}' is not a valid {}", target.data_type))?;
    let stored = ctx
        .codec()
        .encode(&plain, target.data_type, &constraints)
        .context("cannot encode value")?;
    println!("{stored}");
    Ok(Outcome::Passed)
}

pub fn decode(ctx: &ParameterContext, stored: &str, target: &TargetArgs) -> Result<Outcome> {
    let constraints = ctx
        .parser()
        .parse(target.constraints.as_str(), target.data_type)
        .context("cannot parse constraints")?;
    let value = ctx
        .codec()
        .decode(stored, target.data_type, &constraints)
        .context("cannot decode value")?;
    let plain = ctx
        .codec()
        .encode(&value, target.data_type, &without_encryption(&constraints))?;
    println!("{plain}");
    Ok(Outcome::Passed)
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: Vec<SettingRecord>,
}

pub fn check(ctx: &ParameterContext, file: &Path, as_json: bool) -> Result<Outcome> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let parsed: SettingsFile =
        toml::from_str(&text).with_context(|| format!("cannot parse {}", file.display()))?;

    let mut failures = 0;
    let mut report = Vec::with_capacity(parsed.settings.len());
    for record in parsed.settings {
        let mut setting = Setting::from(record);
        match setting.validate(ctx) {
            Ok(results) if results.is_empty() => {
                report.push(json!({ "name": setting.name(), "status": "ok" }));
                if !as_json {
                    println!("{}: ok", setting.name());
                }
            }
            Ok(results) => {
                failures += 1;
                report.push(json!({
                    "name": setting.name(),
                    "status": "invalid",
                    "results": results.iter().map(result_json).collect::<Vec<_>>(),
                }));
                if !as_json {
                    for result in &results {
                        println!("{}: {}", setting.name(), result.message());
                    }
                }
            }
            Err(err) => {
                failures += 1;
                paramguard_log::warn!(setting = setting.name(), code = err.code(), "setting is unusable");
                report.push(json!({
                    "name": setting.name(),
                    "status": "error",
                    "error": err.to_string(),
                }));
                if !as_json {
                    println!("{}: error: {err}", setting.name());
                }
            }
        }
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(Outcome::from_failures(failures))
}
