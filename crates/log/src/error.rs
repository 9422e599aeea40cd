//! Error handling for paramguard-log

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Error type for logger operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    /// The level directive could not be parsed.
    #[error("invalid filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    /// A configuration value was not recognised.
    #[error("configuration error: {0}")]
    Config(String),

    /// A global subscriber is already installed.
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),
}

impl LogError {
    /// Stable error code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Filter { .. } => "LOG:FILTER",
            Self::Config(_) => "LOG:CONFIG",
            Self::AlreadyInitialized(_) => "LOG:ALREADY_INITIALIZED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_filter() {
        let error = LogError::Filter {
            filter: "debug,=x".into(),
            reason: "syntax error".into(),
        };
        assert_eq!(error.code(), "LOG:FILTER");
        assert!(error.to_string().contains("invalid filter 'debug,=x'"));
    }
}
