//! The caller-facing put surface.
//!
//! [`BlobStore`] decides per put whether the multipart strategy runs: only
//! when the put configuration asks for multipart. Directory creation writes
//! an empty marker object named `<name>/` through the same path.

use std::sync::Arc;

use mpustack_core::{MpuConfig, ObjectKey};
use mpustack_s3_model::{Blob, DirectoryOptions, Payload, PutConfiguration};
use tracing::debug;

use crate::client::StorageClient;
use crate::error::UploadError;
use crate::strategy::{MultipartUploadStrategy, SequentialMultipartUpload};
use crate::translate::translate;

/// Content type of directory marker objects.
pub const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";

/// Puts blobs and directory markers into containers.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use mpustack_core::MpuConfig;
/// use mpustack_s3_core::{BlobStore, InMemoryStorageClient};
/// use mpustack_s3_model::{Blob, DirectoryOptions, Payload};
///
/// # tokio_test::block_on(async {
/// let client = Arc::new(InMemoryStorageClient::default());
/// client.create_container("docs").unwrap();
/// let store = BlobStore::new(client.clone(), &MpuConfig::default()).unwrap();
///
/// store.put_blob("docs", &Blob::new("a.txt", Payload::from_bytes("a")), None).await.unwrap();
/// store.create_directory("docs", "drafts", DirectoryOptions::ENCRYPT).await.unwrap();
///
/// assert!(client.get_object("docs", "drafts/").is_some());
/// # });
/// ```
#[derive(Debug)]
pub struct BlobStore<C, M = SequentialMultipartUpload<C>> {
    client: Arc<C>,
    strategy: M,
}

impl<C: StorageClient> BlobStore<C> {
    /// Create a store with the sequential multipart strategy.
    pub fn new(client: Arc<C>, config: &MpuConfig) -> Result<Self, UploadError> {
        let strategy = SequentialMultipartUpload::new(client.clone(), config)?;
        Ok(Self::with_strategy(client, strategy))
    }
}

impl<C: StorageClient, M: MultipartUploadStrategy> BlobStore<C, M> {
    /// Create a store with a custom multipart strategy.
    pub fn with_strategy(client: Arc<C>, strategy: M) -> Self {
        Self { client, strategy }
    }

    /// Put `blob` into `container` and return the object's identifier.
    ///
    /// The multipart strategy runs only if `config` asks for multipart;
    /// otherwise the blob goes up with a single put carrying the translated
    /// main options.
    pub async fn put_blob(
        &self,
        container: &str,
        blob: &Blob,
        config: Option<&PutConfiguration>,
    ) -> Result<String, UploadError> {
        ObjectKey::new(blob.name())?;

        if config.is_some_and(PutConfiguration::multipart) {
            return self.strategy.execute(container, blob, config).await;
        }

        debug!(container = %container, key = %blob.name(), "putting blob without multipart");
        let options = translate(config);
        let etag = self
            .client
            .put_object(container, blob, options.main_options())
            .await?;
        Ok(etag)
    }

    /// Create a directory marker `<name>/` in `container`.
    ///
    /// Trailing slashes on `name` are ignored.
    pub async fn create_directory(
        &self,
        container: &str,
        name: &str,
        options: DirectoryOptions,
    ) -> Result<String, UploadError> {
        let key = format!("{}/", name.trim_end_matches('/'));
        let blob = Blob::new(key, Payload::empty()).with_content_type(DIRECTORY_CONTENT_TYPE);
        let config = options.to_put_configuration();
        debug!(
            container = %container,
            key = %blob.name(),
            encrypt = options.uses_server_side_encryption(),
            "creating directory marker"
        );
        self.put_blob(container, &blob, config.as_ref()).await
    }
}
