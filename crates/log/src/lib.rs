//! # paramguard-log
//!
//! Logging setup shared by the paramguard crates.
//!
//! Library code logs through the re-exported `tracing` macros and never
//! installs a subscriber. Binaries call one of the `init` functions once.
//!
//! ```rust
//! use paramguard_log::{Config, Format};
//!
//! let config = Config::default().with_level("debug").with_format(Format::Json);
//! assert_eq!(config.format, Format::Json);
//! ```

mod builder;
mod config;
mod error;
mod format;

pub use builder::LoggerBuilder;
pub use config::{Config, DisplayConfig, Format, Level};
pub use error::{LogError, LogResult};

pub use tracing::{debug, error, info, instrument, span, trace, warn};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Config, Format, Level, LogResult, auto_init, debug, error, info, init, init_with, trace,
        warn,
    };
}

static TEST_INIT: std::sync::OnceLock<()> = std::sync::OnceLock::new();

// ============================================================================
// Initialization Functions
// ============================================================================

/// Picks a configuration from the environment, falling back to the
/// development preset in debug builds and the production preset otherwise.
pub fn auto_init() -> LogResult<()> {
    if std::env::var("PARAMGUARD_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> LogResult<()> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> LogResult<()> {
    LoggerBuilder::from_config(config).build()
}

/// Installs a trace-level subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test() {
    TEST_INIT.get_or_init(|| {
        if !tracing::dispatcher::has_been_set() {
            let _ = LoggerBuilder::from_config(Config::test())
                .for_tests()
                .build();
        }
    });
}
