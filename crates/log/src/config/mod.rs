//! Configuration types
//!
//! - [`Config`]: level filter, output format and display options
//! - `presets`: development, production and test setups

mod presets;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Level filter in `EnvFilter` syntax, e.g. `info` or `debug,paramguard_core=trace`
    pub level: String,

    /// Output format
    pub format: Format,

    /// Display configuration
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: Format::Compact,
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.display.colors = colors;
        self
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable with colors and indentation
    Pretty,
    /// Compact single-line output
    Compact,
    /// Structured JSON output
    Json,
}

impl Format {
    pub const ALL: [Self; 3] = [Self::Pretty, Self::Compact, Self::Json];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LogError::Config(format!("unknown log format '{s}'")))
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Level for a `-v` count on top of `base`: each step is one level
    /// more verbose, saturating at `Trace`.
    pub const fn raised(self, steps: u8) -> Self {
        let order = [Self::Error, Self::Warn, Self::Info, Self::Debug, Self::Trace];
        let mut index = match self {
            Self::Error => 0,
            Self::Warn => 1,
            Self::Info => 2,
            Self::Debug => 3,
            Self::Trace => 4,
        };
        index += steps as usize;
        if index > 4 {
            index = 4;
        }
        order[index]
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Trace => write!(f, "trace"),
            Level::Debug => write!(f, "debug"),
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warn"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Display configuration
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show timestamps
    pub time: bool,
    /// Show source location (`file:line`)
    pub source: bool,
    /// Show target module
    pub target: bool,
    /// Use ANSI colors
    pub colors: bool,
    /// Flatten JSON events
    pub flatten: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time: true,
            source: false,
            target: true,
            colors: cfg!(feature = "ansi") && std::io::IsTerminal::is_terminal(&std::io::stderr()),
            flatten: true,
        }
    }
}

impl DisplayConfig {
    /// Parse display configuration from environment variables
    pub(crate) fn parse_env(&mut self) {
        if let Ok(v) = std::env::var("PARAMGUARD_LOG_TIME") {
            self.time = is_enabled(&v);
        }
        if let Ok(v) = std::env::var("PARAMGUARD_LOG_SOURCE") {
            self.source = is_enabled(&v);
        }
        if let Ok(v) = std::env::var("PARAMGUARD_LOG_COLORS") {
            self.colors = is_enabled(&v);
        }
    }
}

fn is_enabled(value: &str) -> bool {
    value != "0" && !value.eq_ignore_ascii_case("false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("json", Format::Json)]
    #[case("Pretty", Format::Pretty)]
    #[case(" compact ", Format::Compact)]
    fn formats_parse_case_insensitively(#[case] text: &str, #[case] expected: Format) {
        assert_eq!(text.parse::<Format>().unwrap(), expected);
    }

    #[test]
    fn unknown_format_is_a_config_error() {
        let err = "logfmt".parse::<Format>().unwrap_err();
        assert_eq!(err.code(), "LOG:CONFIG");
    }

    #[rstest]
    #[case(Level::Warn, 0, Level::Warn)]
    #[case(Level::Warn, 1, Level::Info)]
    #[case(Level::Warn, 2, Level::Debug)]
    #[case(Level::Warn, 9, Level::Trace)]
    fn verbosity_raises_the_level(#[case] base: Level, #[case] steps: u8, #[case] expected: Level) {
        assert_eq!(base.raised(steps), expected);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"level": "debug", "format": "json"}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn enabled_values() {
        assert!(is_enabled("1"));
        assert!(is_enabled("yes"));
        assert!(!is_enabled("0"));
        assert!(!is_enabled("FALSE"));
    }
}
