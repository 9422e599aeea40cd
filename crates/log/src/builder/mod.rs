//! Logger builder implementation

use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::{LogError, LogResult};
use crate::format;

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
    test_writer: bool,
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            test_writer: false,
        }
    }

    /// Write through the test harness instead of stderr, so output is
    /// captured per test.
    #[must_use]
    pub fn for_tests(mut self) -> Self {
        self.test_writer = true;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses the level filter without installing anything.
    pub fn filter(&self) -> LogResult<EnvFilter> {
        EnvFilter::try_new(&self.config.level).map_err(|e| LogError::Filter {
            filter: self.config.level.clone(),
            reason: e.to_string(),
        })
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<()> {
        let filter = self.filter()?;
        let layer = if self.test_writer {
            format::make_layer(&self.config, TestWriter::new())
        } else {
            format::make_layer(&self.config, std::io::stderr)
        };

        Registry::default()
            .with(layer)
            .with(filter)
            .try_init()
            .map_err(|e| LogError::AlreadyInitialized(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;

    #[test]
    fn invalid_filter_is_reported_before_install() {
        let builder = LoggerBuilder::from_config(Config::default().with_level("info,paramguard=loud"));
        let err = builder.build().unwrap_err();
        assert!(matches!(err, LogError::Filter { ref filter, .. } if filter == "info,paramguard=loud"));
    }

    #[test]
    fn directives_with_targets_parse() {
        let builder = LoggerBuilder::from_config(
            Config::default()
                .with_level("warn,paramguard_core=trace")
                .with_format(Format::Json),
        );
        assert!(builder.filter().is_ok());
    }

    #[test]
    fn second_install_is_rejected() {
        crate::init_test();
        let err = LoggerBuilder::from_config(Config::test()).for_tests().build().unwrap_err();
        assert_eq!(err.code(), "LOG:ALREADY_INITIALIZED");
    }
}
