//! Options model for mpustack.
//!
//! Two layers of options live here:
//!
//! - [`PutConfiguration`]: what the caller asks for on a put: multipart,
//!   server-side encryption, ACL, storage class. Built once through
//!   [`PutConfigurationBuilder`] and immutable afterwards. The [`Dialect`]
//!   records which of those capabilities the configuration may use.
//! - [`UploadOptions`]: the option set attached to one wire request
//!   (initiate, part, or single put). Renders to `x-{tag}-*` headers.
//!
//! The crate also defines the [`Blob`] being uploaded and its
//! [`ObjectMetadata`] and [`Payload`].

pub mod blob;
pub mod directory;
pub mod error;
pub mod options;
pub mod types;

pub use blob::{Blob, ObjectMetadata, Payload, PayloadSource};
pub use directory::DirectoryOptions;
pub use error::ModelError;
pub use options::{Dialect, PutConfiguration, PutConfigurationBuilder, UploadOptions};
pub use types::{CannedAcl, ServerSideEncryption, StorageClass};
