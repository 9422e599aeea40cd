//! Stored settings.
//!
//! A [`Setting`] owns a constraint string and a value in two forms: the
//! serialized text it is stored as and the typed value the host works with.
//! Only one side is authoritative at a time; [`SyncState`] records which,
//! and the other side is derived on first read.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::constraint::{Constraint, ConstraintList};
use crate::context::ParameterContext;
use crate::data_type::ParameterDataType;
use crate::validation::ParameterValidationResult;
use crate::value::Value;

/// Which representation of a setting's value is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncState {
    /// Both forms agree.
    #[default]
    InSync,
    /// The serialized text changed; the typed value is stale.
    SourceNewer,
    /// The typed value changed; the serialized text is stale.
    DerivedNewer,
}

/// Serialized form of a setting, as stored in settings files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub data_type: ParameterDataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A named, typed, constrained value.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    name: String,
    display_name: Option<String>,
    data_type: ParameterDataType,
    constraint_text: Option<String>,
    constraints: Option<ConstraintList>,
    serialized: Option<String>,
    value: Option<Value>,
    state: SyncState,
}

impl Setting {
    pub fn new(name: impl Into<String>, data_type: ParameterDataType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            data_type,
            constraint_text: None,
            constraints: None,
            serialized: None,
            value: None,
            state: SyncState::InSync,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, text: impl Into<String>) -> Self {
        self.set_constraint_text(Some(text.into()));
        self
    }

    #[must_use]
    pub fn with_serialized_value(mut self, text: impl Into<String>) -> Self {
        self.set_serialized_value(Some(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name, falling back to the name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn data_type(&self) -> ParameterDataType {
        self.data_type
    }

    pub fn constraint_text(&self) -> Option<&str> {
        self.constraint_text.as_deref()
    }

    pub fn sync_state(&self) -> SyncState {
        self.state
    }

    /// Replaces the constraint string; it is parsed again on next use.
    pub fn set_constraint_text(&mut self, text: Option<String>) {
        self.constraint_text = text;
        self.constraints = None;
    }

    /// The parsed constraint list.
    pub fn constraints(&mut self, ctx: &ParameterContext) -> Result<&ConstraintList> {
        self.load_constraints(ctx)?;
        Ok(self.constraints.get_or_insert_with(ConstraintList::new))
    }

    /// Replaces the stored text; the typed value is decoded from it on
    /// next read.
    pub fn set_serialized_value(&mut self, text: Option<String>) {
        self.serialized = text;
        self.value = None;
        self.state = SyncState::SourceNewer;
    }

    /// The stored text, encoding the typed value first if it is newer.
    pub fn serialized_value(&mut self, ctx: &ParameterContext) -> Result<Option<&str>> {
        if self.state == SyncState::DerivedNewer {
            self.load_constraints(ctx)?;
            let encoded =
                ctx.codec()
                    .to_string(self.value.as_ref(), self.data_type, self.constraint_slice())?;
            self.serialized = encoded;
            self.state = SyncState::InSync;
        }
        Ok(self.serialized.as_deref())
    }

    /// The typed value, decoding the stored text first if it is newer.
    pub fn value(&mut self, ctx: &ParameterContext) -> Result<Option<&Value>> {
        if self.state == SyncState::SourceNewer {
            self.load_constraints(ctx)?;
            let decoded = ctx.codec().to_data_type(
                self.serialized.as_deref(),
                self.data_type,
                self.constraint_slice(),
            )?;
            self.value = decoded;
            self.state = SyncState::InSync;
        }
        Ok(self.value.as_ref())
    }

    /// Validates and assigns a new value.
    ///
    /// The value is stored only when validation produced no results; the
    /// results are returned either way.
    pub fn set_value(
        &mut self,
        ctx: &ParameterContext,
        value: Option<Value>,
    ) -> Result<Vec<ParameterValidationResult>> {
        self.load_constraints(ctx)?;
        let results = ctx.validator().validate(
            value.as_ref(),
            self.data_type,
            self.constraint_slice(),
            &self.name,
            self.display_name.as_deref(),
        )?;
        if !results.is_empty() {
            return Ok(results);
        }

        self.value = value
            .map(|value| value.convert_to(self.data_type))
            .transpose()?;
        self.state = SyncState::DerivedNewer;
        Ok(results)
    }

    /// Validates the current value against the current constraints.
    pub fn validate(&mut self, ctx: &ParameterContext) -> Result<Vec<ParameterValidationResult>> {
        self.value(ctx)?;
        self.load_constraints(ctx)?;
        let results = ctx.validator().validate(
            self.value.as_ref(),
            self.data_type,
            self.constraint_slice(),
            &self.name,
            self.display_name.as_deref(),
        )?;
        Ok(results)
    }

    /// Snapshot for storage, with the constraint string in canonical form.
    pub fn to_record(&mut self, ctx: &ParameterContext) -> Result<SettingRecord> {
        let value = self.serialized_value(ctx)?.map(str::to_owned);
        let constraints = match self.constraint_text {
            Some(_) => Some(self.constraints(ctx)?.to_string()),
            None => None,
        };
        Ok(SettingRecord {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            data_type: self.data_type,
            constraints,
            value,
        })
    }

    fn load_constraints(&mut self, ctx: &ParameterContext) -> Result<()> {
        if self.constraints.is_none() {
            let list = ctx
                .parser()
                .parse(self.constraint_text.as_deref(), self.data_type)?;
            self.constraints = Some(list);
        }
        Ok(())
    }

    fn constraint_slice(&self) -> &[Constraint] {
        self.constraints.as_deref().unwrap_or_default()
    }
}

impl From<SettingRecord> for Setting {
    fn from(record: SettingRecord) -> Self {
        let mut setting = Self::new(record.name, record.data_type);
        setting.display_name = record.display_name;
        setting.constraint_text = record.constraints;
        if record.value.is_some() {
            setting.set_serialized_value(record.value);
        }
        setting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConversionError, Error};
    use pretty_assertions::assert_eq;

    fn age() -> Setting {
        Setting::new("age", ParameterDataType::Int32)
            .with_display_name("Age")
            .with_constraints("[MinValue(18)] [MaxValue(88)]")
    }

    #[test]
    fn decodes_on_first_read() {
        let ctx = ParameterContext::default();
        let mut setting = age().with_serialized_value("42");
        assert_eq!(setting.sync_state(), SyncState::SourceNewer);
        assert_eq!(setting.value(&ctx).unwrap(), Some(&Value::Int32(42)));
        assert_eq!(setting.sync_state(), SyncState::InSync);
    }

    #[test]
    fn invalid_values_are_not_stored() {
        let ctx = ParameterContext::default();
        let mut setting = age().with_serialized_value("42");

        let results = setting.set_value(&ctx, Some(Value::Int32(17))).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message(), "Age must be at least 18.");
        assert_eq!(setting.value(&ctx).unwrap(), Some(&Value::Int32(42)));

        let results = setting.set_value(&ctx, Some(Value::Int64(30))).unwrap();
        assert!(results.is_empty());
        assert_eq!(setting.sync_state(), SyncState::DerivedNewer);
        assert_eq!(setting.serialized_value(&ctx).unwrap(), Some("30"));
        assert_eq!(setting.sync_state(), SyncState::InSync);
    }

    #[test]
    fn constraint_changes_take_effect() {
        let ctx = ParameterContext::default();
        let mut setting = age().with_serialized_value("20");
        assert!(setting.validate(&ctx).unwrap().is_empty());

        setting.set_constraint_text(Some("[MinValue(21)]".into()));
        assert_eq!(setting.validate(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn decode_failures_are_errors() {
        let ctx = ParameterContext::default();
        let mut setting = age().with_serialized_value("forty");
        assert!(matches!(
            setting.value(&ctx),
            Err(Error::Conversion(ConversionError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn record_round_trip_canonicalises_constraints() {
        let ctx = ParameterContext::default();
        let record = SettingRecord {
            name: "code".into(),
            display_name: None,
            data_type: ParameterDataType::String,
            constraints: Some("[maxlength(4)]   [uppercase]".into()),
            value: Some("AB".into()),
        };
        let mut setting = Setting::from(record);
        let saved = setting.to_record(&ctx).unwrap();
        assert_eq!(saved.constraints.as_deref(), Some("[MaxLength(4)][Uppercase]"));
        assert_eq!(saved.value.as_deref(), Some("AB"));

        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["type"], "String");
        assert!(json.get("display_name").is_none());
    }
}
