//! The blob being uploaded: metadata plus payload.

use std::collections::HashMap;
use std::path::PathBuf;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ObjectMetadata
// ---------------------------------------------------------------------------

/// Object name, content headers, and user metadata.
///
/// This is what an initiate request carries; the final object inherits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// The object key.
    pub name: String,
    /// The MIME type of the object (e.g. `application/octet-stream`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Content disposition (e.g. `attachment; filename="file.txt"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    /// Content encoding (e.g. `gzip`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    /// Content language (e.g. `en-US`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    /// User-defined metadata (`x-amz-meta-*`).
    #[serde(default)]
    pub user_metadata: HashMap<String, String>,
}

impl ObjectMetadata {
    /// Metadata with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Where payload bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// Bytes held in memory.
    Bytes(Bytes),
    /// A file read lazily, one chunk at a time.
    File(PathBuf),
}

/// Payload bytes plus their declared length.
///
/// The length must be known before a multipart upload starts, because part
/// geometry depends on it. In-memory payloads always know their length;
/// file payloads declare it with [`Payload::with_content_length`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    source: PayloadSource,
    content_length: Option<u64>,
}

impl Payload {
    /// An in-memory payload.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let len = data.len() as u64;
        Self {
            source: PayloadSource::Bytes(data),
            content_length: Some(len),
        }
    }

    /// A file-backed payload with no declared length yet.
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: PayloadSource::File(path.into()),
            content_length: None,
        }
    }

    /// An empty in-memory payload.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Declare the payload length.
    #[must_use]
    pub fn with_content_length(mut self, content_length: u64) -> Self {
        self.content_length = Some(content_length);
        self
    }

    /// The declared length, if known.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// The payload source.
    #[must_use]
    pub fn source(&self) -> &PayloadSource {
        &self.source
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// A named payload ready to be put into a container.
///
/// # Examples
///
/// ```
/// use mpustack_s3_model::{Blob, Payload};
///
/// let blob = Blob::new("reports/q1.csv", Payload::from_bytes("a,b\n1,2\n"))
///     .with_content_type("text/csv")
///     .with_user_metadata("owner", "finance");
///
/// assert_eq!(blob.name(), "reports/q1.csv");
/// assert_eq!(blob.payload().content_length(), Some(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    metadata: ObjectMetadata,
    payload: Payload,
}

impl Blob {
    /// Create a blob with the given name and payload.
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            metadata: ObjectMetadata::named(name),
            payload,
        }
    }

    /// Create a blob from fully specified metadata.
    #[must_use]
    pub fn with_metadata(metadata: ObjectMetadata, payload: Payload) -> Self {
        Self { metadata, payload }
    }

    /// Set the content type.
    #[must_use]
    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        self.metadata.content_type = Some(value.into());
        self
    }

    /// Set the content disposition.
    #[must_use]
    pub fn with_content_disposition(mut self, value: impl Into<String>) -> Self {
        self.metadata.content_disposition = Some(value.into());
        self
    }

    /// Set the content encoding.
    #[must_use]
    pub fn with_content_encoding(mut self, value: impl Into<String>) -> Self {
        self.metadata.content_encoding = Some(value.into());
        self
    }

    /// Set the content language.
    #[must_use]
    pub fn with_content_language(mut self, value: impl Into<String>) -> Self {
        self.metadata.content_language = Some(value.into());
        self
    }

    /// Add one user metadata entry.
    #[must_use]
    pub fn with_user_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.user_metadata.insert(key.into(), value.into());
        self
    }

    /// The object key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The blob metadata.
    #[must_use]
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    /// The blob payload.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}
