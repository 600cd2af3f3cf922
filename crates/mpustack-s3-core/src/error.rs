//! Error types for the upload engine.
//!
//! [`ClientError`] is what a [`StorageClient`](crate::StorageClient) reports
//! for a single remote call. [`UploadError`] is what callers of the engine
//! see; client failures are wrapped in [`UploadError::Client`] unchanged.
//!
//! # Usage
//!
//! ```
//! use mpustack_s3_core::{ClientError, UploadError};
//!
//! let err = ClientError::key_not_found("photos", "cat.jpg", Some("u-1".to_owned()));
//! assert!(err.is_transient());
//!
//! let err: UploadError = ClientError::service("SlowDown", "reduce request rate").into();
//! assert!(matches!(err, UploadError::Client(ClientError::Service { .. })));
//! ```

use mpustack_core::MpuStackError;
use mpustack_s3_model::ModelError;

/// Failure of a single call to the storage service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The service does not see the upload (or key) yet.
    ///
    /// Eventually consistent providers report this shortly after an upload
    /// is initiated; one immediate retry is usually enough.
    #[error("key {key} in {container} not found (upload {})", upload_id.as_deref().unwrap_or("-"))]
    KeyNotFound {
        /// The container the request targeted.
        container: String,
        /// The object key.
        key: String,
        /// The upload the request belonged to, if any.
        upload_id: Option<String>,
    },

    /// Any other service-side failure.
    #[error("{code}: {message}")]
    Service {
        /// The provider error code (e.g. `NoSuchBucket`, `InternalError`).
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl ClientError {
    /// Build a [`ClientError::KeyNotFound`].
    #[must_use]
    pub fn key_not_found(
        container: impl Into<String>,
        key: impl Into<String>,
        upload_id: Option<String>,
    ) -> Self {
        Self::KeyNotFound {
            container: container.into(),
            key: key.into(),
            upload_id,
        }
    }

    /// Build a [`ClientError::Service`].
    #[must_use]
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether the failure is the eventual-consistency symptom that warrants
    /// one retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}

/// Upload engine error type.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The put options were invalid or unsupported.
    #[error(transparent)]
    InvalidConfiguration(#[from] ModelError),

    /// The payload length is not known, so the upload cannot be planned.
    #[error("content length of {key} must be declared before uploading")]
    MissingContentLength {
        /// The object key.
        key: String,
    },

    /// The payload cannot be expressed within the provider's part limits.
    #[error("payload of {length} bytes exceeds the maximum object size of {max} bytes")]
    EntityTooLarge {
        /// The declared payload length.
        length: u64,
        /// The largest payload the limits allow.
        max: u64,
    },

    /// A storage client call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Reading the payload failed.
    #[error("failed to read payload: {0}")]
    Payload(#[from] std::io::Error),

    /// The slicer produced parts that disagree with the slicing plan.
    #[error("payload slices do not match the plan: {message}")]
    SliceMismatch {
        /// Description of the disagreement.
        message: String,
    },

    /// Engine configuration or a name failed validation.
    #[error(transparent)]
    Core(#[from] MpuStackError),
}

impl UploadError {
    pub(crate) fn slice_mismatch(message: impl Into<String>) -> Self {
        Self::SliceMismatch {
            message: message.into(),
        }
    }
}
