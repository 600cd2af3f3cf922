//! Options for creating directory marker objects.

use crate::options::{Dialect, PutConfiguration};

/// How a directory marker should be written.
///
/// Directory creation goes through the same put path as any blob, so the
/// options convert into a [`PutConfiguration`] when they have anything to
/// say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectoryOptions {
    /// Provider defaults.
    #[default]
    Defaults,
    /// Explicitly request (or refuse) server-side encryption.
    ServerSideEncryption(bool),
}

impl DirectoryOptions {
    /// Write the marker with server-side encryption.
    pub const ENCRYPT: Self = Self::ServerSideEncryption(true);
    /// Write the marker without server-side encryption.
    pub const NO_ENCRYPT: Self = Self::ServerSideEncryption(false);

    /// Whether encryption is requested.
    #[must_use]
    pub fn uses_server_side_encryption(&self) -> bool {
        matches!(self, Self::ServerSideEncryption(true))
    }

    /// The equivalent put configuration, or `None` for provider defaults.
    #[must_use]
    pub fn to_put_configuration(&self) -> Option<PutConfiguration> {
        match self {
            Self::Defaults => None,
            Self::ServerSideEncryption(encrypt) => {
                let builder = PutConfiguration::builder_for(Dialect::EncryptionFlag);
                let builder = if *encrypt {
                    builder.server_side_encryption()
                } else {
                    builder
                };
                builder.build().ok()
            }
        }
    }
}
