//! Cutting a payload into contiguous parts.
//!
//! A [`Slicer`] turns a [`Payload`] into a lazy stream of [`PayloadPart`]s of
//! a fixed chunk size. In-memory payloads are sliced without copying; file
//! payloads are read one chunk at a time so only the current part is held in
//! memory.

use std::fmt;
use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use mpustack_s3_model::{Payload, PayloadSource};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::UploadError;

/// A contiguous slice of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    offset: u64,
    data: Bytes,
}

impl PayloadPart {
    /// Create a part starting at `offset`.
    #[must_use]
    pub fn new(offset: u64, data: Bytes) -> Self {
        Self { offset, data }
    }

    /// Byte offset of the part within the payload.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Length of the part in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the part holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The part bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the part, returning its bytes.
    #[must_use]
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// Produces the parts of a payload in order.
///
/// Implementations must yield parts that tile the payload: the first starts
/// at offset 0, each starts where the previous ended, and every part except
/// the last is exactly `chunk_size` bytes.
pub trait Slicer: Send + Sync + fmt::Debug {
    /// Slice `payload` into parts of `chunk_size` bytes.
    fn slice(
        &self,
        payload: &Payload,
        chunk_size: u64,
    ) -> BoxStream<'static, Result<PayloadPart, UploadError>>;
}

/// The default [`Slicer`] for in-memory and file payloads.
///
/// When the payload declares a content length, no more than that many bytes
/// are produced, and a file shorter than declared is an error.
///
/// # Examples
///
/// ```
/// use futures::TryStreamExt;
/// use mpustack_s3_core::{PayloadSlicer, Slicer};
/// use mpustack_s3_model::Payload;
///
/// # tokio_test::block_on(async {
/// let payload = Payload::from_bytes("abcdefg");
/// let parts: Vec<_> = PayloadSlicer.slice(&payload, 3).try_collect().await.unwrap();
///
/// assert_eq!(parts.len(), 3);
/// assert_eq!(parts[2].offset(), 6);
/// assert_eq!(&parts[2].data()[..], b"g");
/// # });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadSlicer;

impl Slicer for PayloadSlicer {
    fn slice(
        &self,
        payload: &Payload,
        chunk_size: u64,
    ) -> BoxStream<'static, Result<PayloadPart, UploadError>> {
        if chunk_size == 0 {
            return stream::once(async {
                Err(UploadError::Payload(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "chunk size must be positive",
                )))
            })
            .boxed();
        }

        match payload.source() {
            PayloadSource::Bytes(data) => {
                slice_bytes(data, payload.content_length(), chunk_size).boxed()
            }
            PayloadSource::File(path) => {
                let state = FileSlice {
                    path: path.clone(),
                    file: None,
                    offset: 0,
                    remaining: payload.content_length(),
                    chunk_size,
                };
                stream::try_unfold(state, next_file_part).boxed()
            }
        }
    }
}

fn slice_bytes(
    data: &Bytes,
    content_length: Option<u64>,
    chunk_size: u64,
) -> impl futures::Stream<Item = Result<PayloadPart, UploadError>> + Send + 'static {
    let limit = content_length.map_or(data.len(), |len| {
        usize::try_from(len).map_or(data.len(), |len| len.min(data.len()))
    });
    let data = data.slice(..limit);
    let chunk = usize::try_from(chunk_size).unwrap_or(usize::MAX);

    let mut start = 0;
    stream::iter(std::iter::from_fn(move || {
        if start >= data.len() {
            return None;
        }
        let end = start.saturating_add(chunk).min(data.len());
        let part = PayloadPart::new(start as u64, data.slice(start..end));
        start = end;
        Some(Ok(part))
    }))
}

#[derive(Debug)]
struct FileSlice {
    path: PathBuf,
    file: Option<File>,
    offset: u64,
    remaining: Option<u64>,
    chunk_size: u64,
}

async fn next_file_part(
    mut state: FileSlice,
) -> Result<Option<(PayloadPart, FileSlice)>, UploadError> {
    let to_read = state
        .remaining
        .map_or(state.chunk_size, |r| r.min(state.chunk_size));
    if to_read == 0 {
        return Ok(None);
    }

    let mut file = match state.file.take() {
        Some(file) => file,
        None => File::open(&state.path).await?,
    };

    let mut buf = Vec::with_capacity(usize::try_from(to_read).unwrap_or_default());
    let read = (&mut file).take(to_read).read_to_end(&mut buf).await? as u64;
    state.file = Some(file);

    if read < to_read && state.remaining.is_some() {
        return Err(UploadError::Payload(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "{} ended at byte {} before its declared length",
                state.path.display(),
                state.offset + read
            ),
        )));
    }
    if read == 0 {
        return Ok(None);
    }

    let part = PayloadPart::new(state.offset, Bytes::from(buf));
    state.offset += read;
    state.remaining = state.remaining.map(|r| r - read);
    Ok(Some((part, state)))
}
