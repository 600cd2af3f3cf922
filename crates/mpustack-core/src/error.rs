//! Error types for the mpustack core.

/// Core error type for mpustack infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum MpuStackError {
    /// A container or object name failed validation.
    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidName {
        /// What was being named (`container` or `object key`).
        kind: &'static str,
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for mpustack core operations.
pub type MpuStackResult<T> = Result<T, MpuStackError>;
