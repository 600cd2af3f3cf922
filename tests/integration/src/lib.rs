//! End-to-end tests for the mpustack upload engine.
//!
//! The tests drive [`BlobStore`] and the sequential multipart strategy
//! against [`InMemoryStorageClient`], so they need no running service.
//!
//! Run them with:
//! ```text
//! cargo test -p mpustack-integration
//! ```

use std::sync::{Arc, Once};

use mpustack_core::MpuConfig;
use mpustack_s3_core::{BlobStore, InMemoryStorageClient};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Limits small enough that a few bytes exercise multipart: 4-byte parts,
/// at most 3 parts before the chunk size grows.
#[must_use]
pub fn tiny_config() -> MpuConfig {
    MpuConfig::builder()
        .part_size(4)
        .min_part_size(1)
        .part_count_ceiling(3)
        .build()
}

/// Generate a unique container name for a test.
#[must_use]
pub fn test_container_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// A client, a store over it, and the name of a fresh container.
pub type MemoryFixture = (
    Arc<InMemoryStorageClient>,
    BlobStore<InMemoryStorageClient>,
    String,
);

/// Create an in-memory client with one fresh container, and a store over it.
pub fn memory_store(
    client: InMemoryStorageClient,
    config: &MpuConfig,
    prefix: &str,
) -> anyhow::Result<MemoryFixture> {
    init_tracing();

    let client = Arc::new(client);
    let container = test_container_name(prefix);
    client.create_container(&container)?;
    let store = BlobStore::new(client.clone(), config)?;
    Ok((client, store, container))
}

/// Deterministic, non-repeating-per-part test bytes.
#[must_use]
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from(i % 251).unwrap_or_default())
        .collect()
}

mod test_abort;
mod test_consistency;
mod test_directory;
mod test_file_payload;
mod test_multipart;
