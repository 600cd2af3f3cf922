//! Records kept by the in-memory store.
//!
//! A [`StoredUpload`] captures the metadata and options provided at
//! initiation and accumulates [`StoredPart`] entries until it is completed
//! into a [`StoredObject`] or aborted.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use mpustack_s3_model::{CannedAcl, ObjectMetadata, StorageClass};
use serde::Serialize;
use uuid::Uuid;

/// Object-level options decoded from request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOptions {
    /// Server-side encryption algorithm, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sse_algorithm: Option<String>,
    /// Canned ACL.
    pub acl: CannedAcl,
    /// Storage class.
    pub storage_class: StorageClass,
}

/// An in-progress multipart upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    /// Unique identifier for this upload.
    pub upload_id: String,
    /// The container the upload targets.
    pub container: String,
    /// The object key that this upload will create.
    pub key: String,
    /// When the upload was initiated.
    pub initiated: DateTime<Utc>,
    /// Object metadata captured at initiation.
    pub metadata: ObjectMetadata,
    /// Options captured at initiation and applied to the final object.
    pub options: StoredOptions,
    /// Parts uploaded so far, keyed by part number (1-based).
    pub parts: BTreeMap<u32, StoredPart>,
    /// Part requests still to be answered with "not found".
    #[serde(skip)]
    pub(crate) invisible_for: u32,
}

impl StoredUpload {
    /// Create a new upload with a fresh id.
    #[must_use]
    pub fn new(
        container: &str,
        metadata: ObjectMetadata,
        options: StoredOptions,
        invisible_for: u32,
    ) -> Self {
        Self {
            upload_id: generate_upload_id(),
            container: container.to_owned(),
            key: metadata.name.clone(),
            initiated: Utc::now(),
            metadata,
            options,
            parts: BTreeMap::new(),
            invisible_for,
        }
    }

    /// Insert or replace a part.
    pub fn put_part(&mut self, part: StoredPart) {
        self.parts.insert(part.part_number, part);
    }

    /// Total size of all uploaded parts.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.parts.values().map(|p| p.size).sum()
    }
}

/// A single part within a multipart upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPart {
    /// The part number (1-based, up to 10 000).
    pub part_number: u32,
    /// Quoted hex MD5 of the part.
    pub etag: String,
    /// Size of this part in bytes.
    pub size: u64,
    /// When this part was uploaded.
    pub last_modified: DateTime<Utc>,
    /// Part bytes.
    #[serde(skip)]
    pub data: Bytes,
}

/// A stored object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// The object key.
    pub key: String,
    /// Quoted ETag; composite (`"<hex>-<n>"`) for multipart objects.
    pub etag: String,
    /// Size in bytes.
    pub size: u64,
    /// When the object was written.
    pub last_modified: DateTime<Utc>,
    /// Metadata supplied by the writer.
    pub metadata: ObjectMetadata,
    /// Options supplied by the writer.
    pub options: StoredOptions,
    /// Number of parts, for objects assembled by a multipart upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts_count: Option<u32>,
    /// Object bytes.
    #[serde(skip)]
    pub data: Bytes,
}

/// Generate a unique upload id (UUID v4 without dashes).
#[must_use]
pub fn generate_upload_id() -> String {
    Uuid::new_v4().simple().to_string()
}
