//! Application configuration.
//!
//! Layers, lowest first: built-in defaults, the config file, `PARAMGUARD_*`
//! environment variables (nested keys split on `__`), then command-line
//! flags.
//!
//! ```toml
//! encryption_key = "base64 of 32 bytes"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [messages]
//! ValueTooSmall = "{0} is below {1}."
//!
//! [[types]]
//! kind = "enum"
//! name = "Acme.Color"
//! members = { Red = 1, Green = 2 }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use paramguard_core::{
    AesGcmCipher, ConstraintParser, MessageCatalog, ParameterContext, ParameterValidator,
    TypeDefinition, TypeRegistry, ValueCodec,
};
use paramguard_log::{Format, Level};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

const DEFAULT_FILE: &str = "paramguard.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LogSettings,
    /// Base64 AES-256 key used by `[Encrypted]` parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
    pub messages: MessageCatalog,
    pub types: Vec<TypeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: Level,
    pub format: Format,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::Warn,
            format: Format::Compact,
        }
    }
}

impl AppConfig {
    /// Loads the layered configuration for `cli`.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file {} does not exist", path.display());
                }
                path.clone()
            }
            None => PathBuf::from(DEFAULT_FILE),
        };
        Self::figment(&file, cli)
            .extract()
            .with_context(|| format!("failed to load configuration from {}", file.display()))
    }

    fn figment(file: &Path, cli: &Cli) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("PARAMGUARD_").split("__"));

        if cli.verbose > 0 {
            let level: Level = figment.extract_inner("logging.level").unwrap_or(Level::Warn);
            figment = figment.merge(Serialized::default("logging.level", level.raised(cli.verbose)));
        }
        if let Some(format) = cli.log_format {
            figment = figment.merge(Serialized::default("logging.format", format));
        }
        figment
    }

    pub fn log_config(&self) -> paramguard_log::Config {
        paramguard_log::Config::default()
            .with_level(self.logging.level.to_string())
            .with_format(self.logging.format)
    }

    /// Builds the parser, codec and validator this configuration describes.
    pub fn context(&self) -> Result<ParameterContext> {
        let registry =
            TypeRegistry::from_definitions(&self.types).context("invalid type definition")?;
        paramguard_log::debug!(types = registry.len(), "loaded type definitions");

        let mut codec = ValueCodec::new();
        if let Some(key) = &self.encryption_key {
            let cipher = AesGcmCipher::from_base64(key).context("invalid encryption key")?;
            codec = codec.with_cipher(Arc::new(cipher));
        }

        Ok(ParameterContext::new(
            ConstraintParser::new().with_type_resolver(Arc::new(registry)),
            codec,
            ParameterValidator::new(Arc::new(self.messages.clone())),
        ))
    }
}
