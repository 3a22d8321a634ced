use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Queue errors
// =============================================================================

/// Errors raised by [`crate::queue::BoundedQueue`].
///
/// `Full` hands the rejected value back so callers of `try_put` never lose it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError<T = ()> {
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,

    #[error("queue is full")]
    Full(T),

    #[error("queue is empty")]
    Empty,
}

impl<T> QueueError<T> {
    /// Returns the value rejected by `try_put`, if any.
    pub fn into_inner(self) -> Option<T> {
        match self {
            QueueError::Full(value) => Some(value),
            _ => None,
        }
    }
}

// =============================================================================
// Command line errors
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("missing required argument <{0}>")]
    MissingArgument(&'static str),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("invalid value '{value}' for <{name}>: expected a positive integer")]
    InvalidCount { name: &'static str, value: String },

    #[error("option '--config' requires a path")]
    MissingConfigPath,
}

// =============================================================================
// Configuration errors
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Run errors
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("a run needs at least one producer and one consumer (got {producers} producers, {consumers} consumers)")]
    InvalidMode { producers: usize, consumers: usize },

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("task failed: {0}")]
    TaskFailed(String),
}

// =============================================================================
// Binary-level error
// =============================================================================

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Run(#[from] RunError),
}

impl AppError {
    /// Process exit status for this error. Usage errors follow the usual
    /// command-line convention of exiting with 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(_) => 2,
            AppError::Config(_) | AppError::Run(_) => 1,
        }
    }
}
