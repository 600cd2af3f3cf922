//! An in-memory [`StorageClient`] for tests and local use.
//!
//! [`InMemoryStorageClient`] behaves like an S3-compatible service closely
//! enough to exercise the upload engine end to end:
//!
//! - options arrive as rendered `x-{tag}-*` headers and are decoded back;
//! - part requests carrying encryption or ACL headers are rejected;
//! - unknown uploads answer part requests with
//!   [`ClientError::KeyNotFound`], and a configurable visibility lag makes
//!   fresh uploads look unknown for their first few part requests;
//! - completion checks every listed part and computes a composite ETag;
//! - one-shot failures can be injected per operation.
//!
//! Every request is recorded with its headers for later inspection.

pub mod state;

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::str::FromStr;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use http::HeaderMap;
use mpustack_core::{ContainerName, MAX_PART_COUNT, MpuConfig, MpuStackResult};
use mpustack_s3_model::{
    Blob, CannedAcl, ObjectMetadata, PayloadSource, StorageClass, UploadOptions,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

pub use self::state::{StoredObject, StoredOptions, StoredPart, StoredUpload};
use crate::checksums;
use crate::client::StorageClient;
use crate::error::ClientError;
use crate::slicer::PayloadPart;

/// The kind of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Initiate a multipart upload.
    InitiateMultipartUpload,
    /// Upload one part.
    UploadPart,
    /// Complete a multipart upload.
    CompleteMultipartUpload,
    /// Abort a multipart upload.
    AbortMultipartUpload,
    /// Single-request put.
    PutObject,
}

/// One request as the service saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Which operation was called.
    pub operation: Operation,
    /// Target container.
    pub container: String,
    /// Target key.
    pub key: String,
    /// Part number, for part uploads.
    pub part_number: Option<u32>,
    /// Option headers sent with the request.
    pub headers: HeaderMap,
}

#[derive(Debug, Default)]
struct FaultPlan {
    initiate: Option<ClientError>,
    parts: HashMap<u32, VecDeque<ClientError>>,
    complete: Option<ClientError>,
    abort: Option<ClientError>,
}

/// In-memory S3-compatible object store.
///
/// # Examples
///
/// ```
/// use mpustack_s3_core::{InMemoryStorageClient, StorageClient};
/// use mpustack_s3_model::{Blob, Payload, UploadOptions};
///
/// # tokio_test::block_on(async {
/// let client = InMemoryStorageClient::default();
/// client.create_container("photos").unwrap();
///
/// let blob = Blob::new("cat.jpg", Payload::from_bytes("meow"));
/// client.put_object("photos", &blob, &UploadOptions::default()).await.unwrap();
///
/// assert_eq!(client.get_object("photos", "cat.jpg").unwrap().size, 4);
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryStorageClient {
    header_tag: String,
    visibility_lag: u32,
    containers: DashMap<String, DateTime<Utc>>,
    objects: DashMap<(String, String), StoredObject>,
    uploads: DashMap<String, StoredUpload>,
    faults: Mutex<FaultPlan>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for InMemoryStorageClient {
    fn default() -> Self {
        Self::new(&MpuConfig::default())
    }
}

impl InMemoryStorageClient {
    /// Create an empty store that decodes `x-{config.header_tag}-*` headers.
    #[must_use]
    pub fn new(config: &MpuConfig) -> Self {
        Self {
            header_tag: config.header_tag.clone(),
            visibility_lag: 0,
            containers: DashMap::new(),
            objects: DashMap::new(),
            uploads: DashMap::new(),
            faults: Mutex::new(FaultPlan::default()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer the first `requests` part uploads of every new upload with
    /// "not found", as an eventually consistent service might.
    #[must_use]
    pub fn with_visibility_lag(mut self, requests: u32) -> Self {
        self.visibility_lag = requests;
        self
    }

    // -----------------------------------------------------------------------
    // Containers and inspection
    // -----------------------------------------------------------------------

    /// Create a container. Creating an existing container is a no-op.
    pub fn create_container(&self, name: &str) -> MpuStackResult<()> {
        let name = ContainerName::new(name)?;
        self.containers
            .entry(name.as_str().to_owned())
            .or_insert_with(Utc::now);
        debug!(container = %name, "created container");
        Ok(())
    }

    /// Fetch a stored object.
    #[must_use]
    pub fn get_object(&self, container: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .get(&(container.to_owned(), key.to_owned()))
            .map(|entry| entry.value().clone())
    }

    /// Number of objects in a container.
    #[must_use]
    pub fn object_count(&self, container: &str) -> usize {
        self.objects
            .iter()
            .filter(|entry| entry.key().0 == container)
            .count()
    }

    /// Ids of the uploads still in progress in a container.
    #[must_use]
    pub fn in_progress_uploads(&self, container: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .uploads
            .iter()
            .filter(|entry| entry.container == container)
            .map(|entry| entry.upload_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// The requests of one kind, in arrival order.
    #[must_use]
    pub fn requests_for(&self, operation: Operation) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.operation == operation)
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Fault injection
    // -----------------------------------------------------------------------

    /// Fail the next initiate request with `error`.
    pub fn fail_initiate(&self, error: ClientError) {
        self.faults.lock().initiate = Some(error);
    }

    /// Fail the next request for `part_number` with `error`.
    ///
    /// Calling this repeatedly queues several failures for the same part.
    pub fn fail_part(&self, part_number: u32, error: ClientError) {
        self.faults
            .lock()
            .parts
            .entry(part_number)
            .or_default()
            .push_back(error);
    }

    /// Fail the next complete request with `error`.
    pub fn fail_complete(&self, error: ClientError) {
        self.faults.lock().complete = Some(error);
    }

    /// Fail the next abort request with `error`.
    pub fn fail_abort(&self, error: ClientError) {
        self.faults.lock().abort = Some(error);
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn record(
        &self,
        operation: Operation,
        container: &str,
        key: &str,
        part_number: Option<u32>,
        options: Option<&UploadOptions>,
    ) -> Result<HeaderMap, ClientError> {
        let headers = match options {
            Some(options) => options
                .request_headers(&self.header_tag)
                .map_err(|e| ClientError::service("InvalidArgument", e.to_string()))?,
            None => HeaderMap::new(),
        };
        trace!(?operation, container, key, ?part_number, "received request");
        self.requests.lock().push(RecordedRequest {
            operation,
            container: container.to_owned(),
            key: key.to_owned(),
            part_number,
            headers: headers.clone(),
        });
        Ok(headers)
    }

    fn ensure_container(&self, container: &str) -> Result<(), ClientError> {
        if self.containers.contains_key(container) {
            Ok(())
        } else {
            Err(ClientError::service(
                "NoSuchBucket",
                format!("the specified container does not exist: {container}"),
            ))
        }
    }

    fn header_name(&self, suffix: &str) -> String {
        format!("x-{}-{suffix}", self.header_tag)
    }

    fn header_str<'a>(
        &self,
        headers: &'a HeaderMap,
        suffix: &str,
    ) -> Result<Option<&'a str>, ClientError> {
        let name = self.header_name(suffix);
        headers
            .get(name.as_str())
            .map(|value| {
                value.to_str().map_err(|_| {
                    ClientError::service("InvalidArgument", format!("invalid {name} header"))
                })
            })
            .transpose()
    }

    fn decode_options(&self, headers: &HeaderMap) -> Result<StoredOptions, ClientError> {
        let sse_algorithm = self
            .header_str(headers, "server-side-encryption")?
            .map(str::to_owned);
        let acl = match self.header_str(headers, "acl")? {
            Some(value) => CannedAcl::from_str(value)
                .map_err(|e| ClientError::service("InvalidArgument", e.to_string()))?,
            None => CannedAcl::default(),
        };
        let storage_class = match self.header_str(headers, "storage-class")? {
            Some(value) => StorageClass::from_str(value)
                .map_err(|e| ClientError::service("InvalidStorageClass", e.to_string()))?,
            None => StorageClass::default(),
        };
        Ok(StoredOptions {
            sse_algorithm,
            acl,
            storage_class,
        })
    }
}

#[async_trait]
impl StorageClient for InMemoryStorageClient {
    async fn initiate_multipart_upload(
        &self,
        container: &str,
        metadata: &ObjectMetadata,
        options: &UploadOptions,
    ) -> Result<String, ClientError> {
        let headers = self.record(
            Operation::InitiateMultipartUpload,
            container,
            &metadata.name,
            None,
            Some(options),
        )?;
        if let Some(err) = self.faults.lock().initiate.take() {
            return Err(err);
        }
        self.ensure_container(container)?;

        let options = self.decode_options(&headers)?;
        let upload = StoredUpload::new(container, metadata.clone(), options, self.visibility_lag);
        let upload_id = upload.upload_id.clone();
        self.uploads.insert(upload_id.clone(), upload);

        debug!(
            container,
            key = %metadata.name,
            upload_id = %upload_id,
            "initiate_multipart_upload completed"
        );
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        container: &str,
        key: &str,
        part_number: u32,
        upload_id: &str,
        part: &PayloadPart,
        options: &UploadOptions,
    ) -> Result<String, ClientError> {
        let headers = self.record(
            Operation::UploadPart,
            container,
            key,
            Some(part_number),
            Some(options),
        )?;
        let injected = self
            .faults
            .lock()
            .parts
            .get_mut(&part_number)
            .and_then(VecDeque::pop_front);
        if let Some(err) = injected {
            return Err(err);
        }

        for suffix in ["server-side-encryption", "acl"] {
            let name = self.header_name(suffix);
            if headers.contains_key(name.as_str()) {
                return Err(ClientError::service(
                    "InvalidRequest",
                    format!("{name} is not allowed on part requests"),
                ));
            }
        }
        if part_number == 0 || part_number > MAX_PART_COUNT {
            return Err(ClientError::service(
                "InvalidArgument",
                format!("part number must be between 1 and {MAX_PART_COUNT}"),
            ));
        }
        self.ensure_container(container)?;

        let not_found =
            || ClientError::key_not_found(container, key, Some(upload_id.to_owned()));
        let mut upload = self.uploads.get_mut(upload_id).ok_or_else(not_found)?;
        if upload.container != container || upload.key != key {
            return Err(not_found());
        }
        if upload.invisible_for > 0 {
            upload.invisible_for -= 1;
            trace!(upload_id, part_number, "upload not visible yet");
            return Err(not_found());
        }

        let data = part.data().clone();
        let etag = checksums::compute_etag(&data);
        let size = data.len() as u64;
        upload.put_part(StoredPart {
            part_number,
            etag: etag.clone(),
            size,
            last_modified: Utc::now(),
            data,
        });

        debug!(container, key, upload_id, part_number, size, "upload_part completed");
        Ok(etag)
    }

    async fn complete_multipart_upload(
        &self,
        container: &str,
        key: &str,
        upload_id: &str,
        parts: &BTreeMap<u32, String>,
    ) -> Result<String, ClientError> {
        self.record(
            Operation::CompleteMultipartUpload,
            container,
            key,
            None,
            None,
        )?;
        if let Some(err) = self.faults.lock().complete.take() {
            return Err(err);
        }
        self.ensure_container(container)?;

        let no_such_upload = || {
            ClientError::service(
                "NoSuchUpload",
                format!("the specified upload does not exist: {upload_id}"),
            )
        };
        if parts.is_empty() {
            return Err(ClientError::service(
                "MalformedXML",
                "a multipart upload needs at least one part",
            ));
        }

        let (object, part_count) = {
            let upload = self.uploads.get(upload_id).ok_or_else(no_such_upload)?;
            if upload.container != container || upload.key != key {
                return Err(no_such_upload());
            }

            let mut combined = BytesMut::new();
            let mut etags = Vec::with_capacity(parts.len());
            for (part_number, etag) in parts {
                let stored = upload
                    .parts
                    .get(part_number)
                    .filter(|stored| stored.etag == *etag)
                    .ok_or_else(|| {
                        ClientError::service(
                            "InvalidPart",
                            format!("part {part_number} was not uploaded with ETag {etag}"),
                        )
                    })?;
                combined.extend_from_slice(&stored.data);
                etags.push(stored.etag.as_str());
            }

            let data = combined.freeze();
            let part_count = u32::try_from(parts.len()).unwrap_or(u32::MAX);
            let object = StoredObject {
                key: key.to_owned(),
                etag: checksums::compute_multipart_etag(&etags),
                size: data.len() as u64,
                last_modified: Utc::now(),
                metadata: upload.metadata.clone(),
                options: upload.options.clone(),
                parts_count: Some(part_count),
                data,
            };
            (object, part_count)
        };

        self.uploads.remove(upload_id);
        let etag = object.etag.clone();
        debug!(
            container,
            key,
            upload_id,
            size = object.size,
            parts = part_count,
            "complete_multipart_upload completed"
        );
        self.objects
            .insert((container.to_owned(), key.to_owned()), object);
        Ok(etag)
    }

    async fn abort_multipart_upload(
        &self,
        container: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), ClientError> {
        self.record(Operation::AbortMultipartUpload, container, key, None, None)?;
        if let Some(err) = self.faults.lock().abort.take() {
            return Err(err);
        }

        let removed = self
            .uploads
            .remove_if(upload_id, |_, upload| {
                upload.container == container && upload.key == key
            })
            .ok_or_else(|| {
                ClientError::service(
                    "NoSuchUpload",
                    format!("the specified upload does not exist: {upload_id}"),
                )
            })?;

        debug!(
            container,
            key,
            upload_id,
            parts = removed.1.parts.len(),
            "abort_multipart_upload completed"
        );
        Ok(())
    }

    async fn put_object(
        &self,
        container: &str,
        blob: &Blob,
        options: &UploadOptions,
    ) -> Result<String, ClientError> {
        let headers = self.record(Operation::PutObject, container, blob.name(), None, Some(options))?;
        self.ensure_container(container)?;
        let options = self.decode_options(&headers)?;

        let data = match blob.payload().source() {
            PayloadSource::Bytes(data) => data.clone(),
            PayloadSource::File(path) => Bytes::from(tokio::fs::read(path).await.map_err(|e| {
                ClientError::service(
                    "InternalError",
                    format!("failed to read {}: {e}", path.display()),
                )
            })?),
        };
        let data = match blob.payload().content_length() {
            Some(declared) if (data.len() as u64) < declared => {
                return Err(ClientError::service(
                    "IncompleteBody",
                    format!(
                        "request body is {} bytes, content length declares {declared}",
                        data.len()
                    ),
                ));
            }
            Some(declared) => data.slice(..usize::try_from(declared).unwrap_or(data.len())),
            None => data,
        };

        let etag = checksums::compute_etag(&data);
        let object = StoredObject {
            key: blob.name().to_owned(),
            etag: etag.clone(),
            size: data.len() as u64,
            last_modified: Utc::now(),
            metadata: blob.metadata().clone(),
            options,
            parts_count: None,
            data,
        };
        debug!(container, key = %blob.name(), size = object.size, "put_object completed");
        self.objects
            .insert((container.to_owned(), blob.name().to_owned()), object);
        Ok(etag)
    }
}
