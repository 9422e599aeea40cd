//! paramguard - check constrained parameters from the command line.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;

use cli::{Cli, Command};
use commands::Outcome;
use config::AppConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(Outcome::Passed) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let config = AppConfig::load(&cli)?;
    paramguard_log::init_with(config.log_config())?;
    let ctx = config.context()?;

    match cli.command {
        Command::Parse {
            constraints,
            data_type,
            json,
        } => commands::parse(&ctx, &constraints, data_type, json),
        Command::Validate {
            value,
            target,
            name,
            display_name,
            json,
        } => commands::validate(&ctx, &value, &target, &name, display_name.as_deref(), json),
        Command::Encode { value, target } => commands::encode(&ctx, &value, &target),
        Command::Decode { value, target } => commands::decode(&ctx, &value, &target),
        Command::Check { file, json } => commands::check(&ctx, &file, json),
    }
}
