//! Validated names shared across the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MpuStackError;

/// Maximum object key length in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Minimum container name length.
const MIN_CONTAINER_NAME_LEN: usize = 3;

/// Maximum container name length.
const MAX_CONTAINER_NAME_LEN: usize = 63;

/// A container (bucket) name.
///
/// Rules:
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`)
///
/// # Examples
///
/// ```
/// use mpustack_core::ContainerName;
///
/// assert!(ContainerName::new("my-valid-bucket").is_ok());
/// assert!(ContainerName::new("AB").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerName(String);

impl ContainerName {
    /// Validate and wrap a container name.
    pub fn new(name: impl Into<String>) -> Result<Self, MpuStackError> {
        let name = name.into();
        let invalid = |reason: &str| MpuStackError::InvalidName {
            kind: "container",
            name: name.clone(),
            reason: reason.to_owned(),
        };

        let len = name.len();
        if !(MIN_CONTAINER_NAME_LEN..=MAX_CONTAINER_NAME_LEN).contains(&len) {
            return Err(invalid("must be between 3 and 63 characters long"));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
        {
            return Err(invalid(
                "must only contain lowercase letters, numbers, hyphens, and dots",
            ));
        }
        let bytes = name.as_bytes();
        let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
        if !edge_ok(bytes[0]) || !edge_ok(bytes[len - 1]) {
            return Err(invalid("must start and end with a letter or number"));
        }
        if name.contains("..") {
            return Err(invalid("must not contain consecutive dots"));
        }

        Ok(Self(name))
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An object key: 1-1024 bytes of UTF-8.
///
/// # Examples
///
/// ```
/// use mpustack_core::ObjectKey;
///
/// assert!(ObjectKey::new("photos/2024/image.jpg").is_ok());
/// assert!(ObjectKey::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and wrap an object key.
    pub fn new(key: impl Into<String>) -> Result<Self, MpuStackError> {
        let key = key.into();
        if key.is_empty() {
            return Err(MpuStackError::InvalidName {
                kind: "object key",
                name: key,
                reason: "must not be empty".to_owned(),
            });
        }
        if key.len() > MAX_KEY_BYTES {
            return Err(MpuStackError::InvalidName {
                kind: "object key",
                name: key,
                reason: format!("must not exceed {MAX_KEY_BYTES} bytes"),
            });
        }
        Ok(Self(key))
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
