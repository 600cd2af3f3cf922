//! Multipart upload orchestration.
//!
//! [`SequentialMultipartUpload`] drives one upload end to end:
//!
//! 1. Plan the part geometry from the declared payload length.
//! 2. Payloads at or below the threshold go up with a single put.
//! 3. Otherwise initiate with the main options, upload each part with the
//!    part options in order, and complete with the collected checksums.
//!
//! A part upload that fails with
//! [`ClientError::KeyNotFound`](crate::ClientError::KeyNotFound) is retried
//! once, immediately. Any other failure after initiation aborts the upload
//! exactly once and is returned to the caller unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mpustack_core::{MpuConfig, MpuStackResult};
use mpustack_s3_model::{Blob, Payload, PutConfiguration, UploadOptions};
use tracing::{debug, info, trace, warn};

use crate::client::StorageClient;
use crate::error::UploadError;
use crate::slicer::{PayloadPart, PayloadSlicer, Slicer};
use crate::slicing::{SlicingAlgorithm, SlicingPlan};
use crate::translate::translate;

/// A way of putting a blob that may split it into parts.
#[async_trait]
pub trait MultipartUploadStrategy: Send + Sync + fmt::Debug {
    /// Upload `blob` into `container` and return the final object's
    /// identifier.
    async fn execute(
        &self,
        container: &str,
        blob: &Blob,
        config: Option<&PutConfiguration>,
    ) -> Result<String, UploadError>;
}

// ---------------------------------------------------------------------------
// Upload state
// ---------------------------------------------------------------------------

/// Lifecycle of one multipart upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UploadState {
    NotStarted,
    Initiated,
    UploadingParts,
    Completing,
    Done,
    Aborting,
    Aborted,
}

impl UploadState {
    fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Initiated)
                | (Self::Initiated, Self::UploadingParts | Self::Aborting)
                | (Self::UploadingParts, Self::Completing | Self::Aborting)
                | (Self::Completing, Self::Done | Self::Aborting)
                | (Self::Aborting, Self::Aborted)
        )
    }
}

/// Bookkeeping for one in-flight upload. Never escapes `execute`.
#[derive(Debug)]
pub(crate) struct UploadTransaction {
    container: String,
    key: String,
    upload_id: Option<String>,
    state: UploadState,
    parts: BTreeMap<u32, String>,
}

impl UploadTransaction {
    fn new(container: &str, key: &str) -> Self {
        Self {
            container: container.to_owned(),
            key: key.to_owned(),
            upload_id: None,
            state: UploadState::NotStarted,
            parts: BTreeMap::new(),
        }
    }

    fn initiated(&mut self, upload_id: String) {
        self.upload_id = Some(upload_id);
        self.advance(UploadState::Initiated);
    }

    fn upload_id(&self) -> &str {
        self.upload_id.as_deref().unwrap_or_default()
    }

    fn advance(&mut self, next: UploadState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal upload state transition {:?} -> {next:?}",
            self.state
        );
        trace!(
            upload_id = %self.upload_id(),
            from = ?self.state,
            to = ?next,
            "upload state transition"
        );
        self.state = next;
    }

    fn record_part(&mut self, part_number: u32, checksum: String) {
        self.parts.insert(part_number, checksum);
    }
}

// ---------------------------------------------------------------------------
// SequentialMultipartUpload
// ---------------------------------------------------------------------------

/// Uploads parts one at a time, in order.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use mpustack_core::MpuConfig;
/// use mpustack_s3_core::{InMemoryStorageClient, MultipartUploadStrategy, SequentialMultipartUpload};
/// use mpustack_s3_model::{Blob, Payload, PutConfiguration};
///
/// # tokio_test::block_on(async {
/// let client = Arc::new(InMemoryStorageClient::default());
/// client.create_container("backups").unwrap();
///
/// let strategy = SequentialMultipartUpload::new(client.clone(), &MpuConfig::default()).unwrap();
/// let config = PutConfiguration::builder().multipart().build().unwrap();
/// let blob = Blob::new("small.txt", Payload::from_bytes("hello"));
///
/// let etag = strategy.execute("backups", &blob, Some(&config)).await.unwrap();
/// assert_eq!(client.get_object("backups", "small.txt").unwrap().etag, etag);
/// # });
/// ```
#[derive(Debug)]
pub struct SequentialMultipartUpload<C, S = PayloadSlicer> {
    client: Arc<C>,
    algorithm: SlicingAlgorithm,
    slicer: S,
}

impl<C: StorageClient> SequentialMultipartUpload<C> {
    /// Create a strategy with the default slicer and the given limits.
    pub fn new(client: Arc<C>, config: &MpuConfig) -> MpuStackResult<Self> {
        Ok(Self::with_parts(
            client,
            SlicingAlgorithm::new(config)?,
            PayloadSlicer,
        ))
    }
}

impl<C: StorageClient, S: Slicer> SequentialMultipartUpload<C, S> {
    /// Create a strategy from its collaborators.
    pub fn with_parts(client: Arc<C>, algorithm: SlicingAlgorithm, slicer: S) -> Self {
        Self {
            client,
            algorithm,
            slicer,
        }
    }

    /// The storage client this strategy drives.
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    async fn upload_and_complete(
        &self,
        tx: &mut UploadTransaction,
        payload: &Payload,
        plan: &SlicingPlan,
        part_options: &UploadOptions,
    ) -> Result<String, UploadError> {
        tx.advance(UploadState::UploadingParts);

        let mut parts = self.slicer.slice(payload, plan.chunk_size());
        let mut cursor = plan.cursor();
        while let Some(part) = parts.try_next().await? {
            let part_number = cursor.next_part();
            let offset = cursor.next_offset();
            check_part(plan, part_number, offset, &part)?;

            let checksum = self
                .upload_part_with_retry(tx, part_number, &part, part_options)
                .await?;
            debug!(
                container = %tx.container,
                key = %tx.key,
                upload_id = %tx.upload_id(),
                part_number,
                size = part.len(),
                "uploaded part"
            );
            tx.record_part(part_number, checksum);
        }

        let uploaded = tx.parts.len();
        if uploaded != plan.part_count() as usize {
            return Err(UploadError::slice_mismatch(format!(
                "expected {} parts, payload produced {uploaded}",
                plan.part_count()
            )));
        }

        tx.advance(UploadState::Completing);
        let etag = self
            .client
            .complete_multipart_upload(&tx.container, &tx.key, tx.upload_id(), &tx.parts)
            .await?;
        Ok(etag)
    }

    async fn upload_part_with_retry(
        &self,
        tx: &UploadTransaction,
        part_number: u32,
        part: &PayloadPart,
        options: &UploadOptions,
    ) -> Result<String, UploadError> {
        let attempt = self
            .client
            .upload_part(
                &tx.container,
                &tx.key,
                part_number,
                tx.upload_id(),
                part,
                options,
            )
            .await;

        match attempt {
            Ok(checksum) => Ok(checksum),
            Err(err) if err.is_transient() => {
                warn!(
                    container = %tx.container,
                    key = %tx.key,
                    upload_id = %tx.upload_id(),
                    part_number,
                    error = %err,
                    "part upload not visible yet, retrying once"
                );
                let checksum = self
                    .client
                    .upload_part(
                        &tx.container,
                        &tx.key,
                        part_number,
                        tx.upload_id(),
                        part,
                        options,
                    )
                    .await?;
                Ok(checksum)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn abort(&self, tx: &mut UploadTransaction, cause: &UploadError) {
        tx.advance(UploadState::Aborting);
        warn!(
            container = %tx.container,
            key = %tx.key,
            upload_id = %tx.upload_id(),
            error = %cause,
            "aborting multipart upload"
        );

        if let Err(err) = self
            .client
            .abort_multipart_upload(&tx.container, &tx.key, tx.upload_id())
            .await
        {
            warn!(
                container = %tx.container,
                key = %tx.key,
                upload_id = %tx.upload_id(),
                error = %err,
                "failed to abort multipart upload"
            );
        }
        tx.advance(UploadState::Aborted);
    }
}

#[async_trait]
impl<C: StorageClient, S: Slicer> MultipartUploadStrategy for SequentialMultipartUpload<C, S> {
    async fn execute(
        &self,
        container: &str,
        blob: &Blob,
        config: Option<&PutConfiguration>,
    ) -> Result<String, UploadError> {
        let key = blob.name();
        let length = blob
            .payload()
            .content_length()
            .ok_or_else(|| UploadError::MissingContentLength {
                key: key.to_owned(),
            })?;
        let plan = self.algorithm.plan(length)?;
        let options = translate(config);

        if plan.is_single_part() {
            debug!(
                container = %container,
                key = %key,
                length,
                "payload below multipart threshold, using a single put"
            );
            let etag = self
                .client
                .put_object(container, blob, options.main_options())
                .await?;
            return Ok(etag);
        }

        let mut tx = UploadTransaction::new(container, key);
        let upload_id = self
            .client
            .initiate_multipart_upload(container, blob.metadata(), options.main_options())
            .await?;
        tx.initiated(upload_id);
        info!(
            container = %container,
            key = %key,
            upload_id = %tx.upload_id(),
            length,
            part_count = plan.part_count(),
            chunk_size = plan.chunk_size(),
            "initiated multipart upload"
        );

        match self
            .upload_and_complete(&mut tx, blob.payload(), &plan, options.part_options())
            .await
        {
            Ok(etag) => {
                tx.advance(UploadState::Done);
                info!(
                    container = %container,
                    key = %key,
                    upload_id = %tx.upload_id(),
                    etag = %etag,
                    "completed multipart upload"
                );
                Ok(etag)
            }
            Err(err) => {
                self.abort(&mut tx, &err).await;
                Err(err)
            }
        }
    }
}

fn check_part(
    plan: &SlicingPlan,
    part_number: u32,
    offset: u64,
    part: &PayloadPart,
) -> Result<(), UploadError> {
    let Some(expected_len) = plan.part_size(part_number) else {
        return Err(UploadError::slice_mismatch(format!(
            "payload produced more than {} parts",
            plan.part_count()
        )));
    };
    if part.offset() != offset {
        return Err(UploadError::slice_mismatch(format!(
            "part {part_number} starts at {}, expected {offset}",
            part.offset()
        )));
    }
    if part.len() != expected_len {
        return Err(UploadError::slice_mismatch(format!(
            "part {part_number} is {} bytes, expected {expected_len}",
            part.len()
        )));
    }
    Ok(())
}
