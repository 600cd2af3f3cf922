//! The storage service seam.
//!
//! [`StorageClient`] is the wire-level surface the engine drives. A real
//! implementation talks to an S3-compatible service; the crate ships
//! [`InMemoryStorageClient`](crate::InMemoryStorageClient) for tests and
//! local use.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use mpustack_s3_model::{Blob, ObjectMetadata, UploadOptions};

use crate::error::ClientError;
use crate::slicer::PayloadPart;

/// Operations of an S3-compatible object store used by the upload engine.
///
/// Every method is one request. Retrying, aborting, and ordering are the
/// caller's business.
#[async_trait]
pub trait StorageClient: Send + Sync + fmt::Debug {
    /// Start a multipart upload of `metadata.name` and return its upload id.
    ///
    /// `options` fix the properties of the final object (encryption, ACL,
    /// storage class).
    async fn initiate_multipart_upload(
        &self,
        container: &str,
        metadata: &ObjectMetadata,
        options: &UploadOptions,
    ) -> Result<String, ClientError>;

    /// Upload one part and return the checksum (ETag) the service assigned.
    async fn upload_part(
        &self,
        container: &str,
        key: &str,
        part_number: u32,
        upload_id: &str,
        part: &PayloadPart,
        options: &UploadOptions,
    ) -> Result<String, ClientError>;

    /// Assemble the uploaded parts into the final object and return its
    /// identifier (ETag).
    async fn complete_multipart_upload(
        &self,
        container: &str,
        key: &str,
        upload_id: &str,
        parts: &BTreeMap<u32, String>,
    ) -> Result<String, ClientError>;

    /// Discard an upload and all of its parts.
    async fn abort_multipart_upload(
        &self,
        container: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), ClientError>;

    /// Store a whole blob with a single request and return its identifier.
    async fn put_object(
        &self,
        container: &str,
        blob: &Blob,
        options: &UploadOptions,
    ) -> Result<String, ClientError>;
}
