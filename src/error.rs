//! Error types for the MissionMinder agent.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum MinderError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// A background task panicked or could not be joined.
    #[error("task error: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, MinderError>;
