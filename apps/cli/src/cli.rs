//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use paramguard_core::ParameterDataType;
use paramguard_log::Format;

/// Parse, validate and convert constrained parameters.
///
/// ```bash
/// paramguard parse "[MinValue(1)] [MaxValue(10)]" --type int32
/// paramguard validate 17 --type int32 --constraints "[MinValue(18)]" --display-name Age
/// paramguard check settings.toml
/// ```
#[derive(Parser, Debug)]
#[command(name = "paramguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./paramguard.toml when present)
    #[arg(short, long, global = true, env = "PARAMGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output; repeat for more
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<Format>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a constraint string and print its canonical form
    Parse {
        /// Constraint string, e.g. "[MinLength(2)][Uppercase]"
        constraints: String,

        /// Data type the constraints apply to
        #[arg(short = 't', long = "type")]
        data_type: ParameterDataType,

        /// Print the constraint list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a plain value; exits with 1 when the value fails
    Validate {
        /// The value in its plain text form
        value: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Parameter name used in results
        #[arg(short, long, default_value = "value")]
        name: String,

        /// Name shown in messages (default: the parameter name)
        #[arg(short, long)]
        display_name: Option<String>,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a plain value to its stored form
    Encode {
        value: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Convert a stored value back to its plain form
    Decode {
        value: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Validate every setting in a settings file; exits with 1 when any fails
    Check {
        /// TOML file with a `[[settings]]` array
        file: PathBuf,

        /// Print a JSON report
        #[arg(long)]
        json: bool,
    },
}

/// Data type and constraints of the value being processed.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Data type name, e.g. int32, string, enum
    #[arg(short = 't', long = "type")]
    pub data_type: ParameterDataType,

    /// Constraint string
    #[arg(short = 'C', long, default_value = "")]
    pub constraints: String,
}
