//! Sequential multipart upload engine.
//!
//! Splits a payload into parts, drives the initiate / upload-part / complete
//! protocol against a [`StorageClient`], and aborts the upload on any
//! unrecoverable failure.
//!
//! # Architecture
//!
//! ```text
//! BlobStore (put_blob, create_directory)
//!        |
//!        v
//! SequentialMultipartUpload (MultipartUploadStrategy impl)
//!   |            |              |
//!   v            v              v
//! translate   SlicingAlgorithm  Slicer
//!   |            |              |
//!   +------------+--------------+
//!                |
//!                v
//!          StorageClient (remote service, or InMemoryStorageClient)
//! ```
//!
//! Parts are uploaded one at a time, in part-number order.

pub mod blobstore;
pub mod checksums;
pub mod client;
pub mod error;
pub mod memory;
pub mod slicer;
pub mod slicing;
pub mod strategy;
pub mod translate;

pub use blobstore::BlobStore;
pub use client::StorageClient;
pub use error::{ClientError, UploadError};
pub use memory::InMemoryStorageClient;
pub use slicer::{PayloadPart, PayloadSlicer, Slicer};
pub use slicing::{PartCursor, SlicingAlgorithm, SlicingPlan};
pub use strategy::{MultipartUploadStrategy, SequentialMultipartUpload};
pub use translate::{TranslatedOptions, translate};
