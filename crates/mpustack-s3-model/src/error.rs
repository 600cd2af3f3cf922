//! Errors raised while building options.

/// Options model error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// An option set was constructed with invalid or unsupported values.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the problem.
        message: String,
    },

    /// An option could not be rendered as an HTTP header.
    #[error("invalid header {name}: {message}")]
    InvalidHeader {
        /// The header name that was being rendered.
        name: String,
        /// Description of the problem.
        message: String,
    },
}

impl ModelError {
    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}
