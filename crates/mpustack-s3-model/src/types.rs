//! Value types carried by put options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// CannedAcl
// ---------------------------------------------------------------------------

/// Predefined (canned) access policy applied to an uploaded object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CannedAcl {
    /// Owner gets `FULL_CONTROL`. No one else has access rights (default).
    #[default]
    #[serde(rename = "private")]
    Private,
    /// Owner gets `FULL_CONTROL`. The `AllUsers` group gets `READ` access.
    #[serde(rename = "public-read")]
    PublicRead,
    /// Owner gets `FULL_CONTROL`. The `AllUsers` group gets `READ` and `WRITE` access.
    #[serde(rename = "public-read-write")]
    PublicReadWrite,
    /// Owner gets `FULL_CONTROL`. The `AuthenticatedUsers` group gets `READ` access.
    #[serde(rename = "authenticated-read")]
    AuthenticatedRead,
    /// Object owner gets `FULL_CONTROL`. Bucket owner gets `READ` access.
    #[serde(rename = "bucket-owner-read")]
    BucketOwnerRead,
    /// Both the object owner and the bucket owner get `FULL_CONTROL`.
    #[serde(rename = "bucket-owner-full-control")]
    BucketOwnerFullControl,
}

impl CannedAcl {
    /// Return the wire representation of the canned ACL.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
            Self::BucketOwnerRead => "bucket-owner-read",
            Self::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`CannedAcl`] from a string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown canned ACL: {0}")]
pub struct ParseCannedAclError(String);

impl FromStr for CannedAcl {
    type Err = ParseCannedAclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public-read" => Ok(Self::PublicRead),
            "public-read-write" => Ok(Self::PublicReadWrite),
            "authenticated-read" => Ok(Self::AuthenticatedRead),
            "bucket-owner-read" => Ok(Self::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(Self::BucketOwnerFullControl),
            _ => Err(ParseCannedAclError(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerSideEncryption
// ---------------------------------------------------------------------------

/// A named server-side encryption algorithm (e.g. `AES256`, `aws:kms`).
///
/// The name is sent verbatim as a header value, so it must be non-empty
/// visible ASCII.
///
/// # Examples
///
/// ```
/// use mpustack_s3_model::ServerSideEncryption;
///
/// let sse = ServerSideEncryption::new("aws:kms").unwrap();
/// assert_eq!(sse.as_str(), "aws:kms");
/// assert!(ServerSideEncryption::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerSideEncryption(String);

impl ServerSideEncryption {
    /// S3-managed keys; the only algorithm the boolean-flag dialect can express.
    pub const AES256: &'static str = "AES256";
    /// KMS-managed keys.
    pub const AWS_KMS: &'static str = "aws:kms";

    /// Validate an algorithm name.
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::invalid_configuration(
                "server-side encryption requested with an empty algorithm name",
            ));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ModelError::invalid_configuration(format!(
                "server-side encryption algorithm {name:?} contains non-printable characters"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The `AES256` algorithm.
    #[must_use]
    pub fn aes256() -> Self {
        Self(Self::AES256.to_owned())
    }

    /// The algorithm name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerSideEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ServerSideEncryption {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServerSideEncryption> for String {
    fn from(value: ServerSideEncryption) -> Self {
        value.0
    }
}

// ---------------------------------------------------------------------------
// StorageClass
// ---------------------------------------------------------------------------

/// Storage class of the final object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageClass {
    /// General purpose storage (default).
    #[default]
    #[serde(rename = "STANDARD")]
    Standard,
    /// Infrequent access.
    #[serde(rename = "STANDARD_IA")]
    StandardIa,
    /// Infrequent access, single availability zone.
    #[serde(rename = "ONEZONE_IA")]
    OnezoneIa,
    /// Automatic tiering by access pattern.
    #[serde(rename = "INTELLIGENT_TIERING")]
    IntelligentTiering,
    /// Legacy reduced redundancy storage.
    #[serde(rename = "REDUCED_REDUNDANCY")]
    ReducedRedundancy,
    /// Archive storage.
    #[serde(rename = "GLACIER")]
    Glacier,
    /// Archive storage with instant retrieval.
    #[serde(rename = "GLACIER_IR")]
    GlacierIr,
    /// Long-term archive storage.
    #[serde(rename = "DEEP_ARCHIVE")]
    DeepArchive,
}

impl StorageClass {
    /// Return the wire representation of the storage class.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::StandardIa => "STANDARD_IA",
            Self::OnezoneIa => "ONEZONE_IA",
            Self::IntelligentTiering => "INTELLIGENT_TIERING",
            Self::ReducedRedundancy => "REDUCED_REDUNDANCY",
            Self::Glacier => "GLACIER",
            Self::GlacierIr => "GLACIER_IR",
            Self::DeepArchive => "DEEP_ARCHIVE",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`StorageClass`] from a string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown storage class: {0}")]
pub struct ParseStorageClassError(String);

impl FromStr for StorageClass {
    type Err = ParseStorageClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STANDARD" => Ok(Self::Standard),
            "STANDARD_IA" => Ok(Self::StandardIa),
            "ONEZONE_IA" => Ok(Self::OnezoneIa),
            "INTELLIGENT_TIERING" => Ok(Self::IntelligentTiering),
            "REDUCED_REDUNDANCY" => Ok(Self::ReducedRedundancy),
            "GLACIER" => Ok(Self::Glacier),
            "GLACIER_IR" => Ok(Self::GlacierIr),
            "DEEP_ARCHIVE" => Ok(Self::DeepArchive),
            _ => Err(ParseStorageClassError(s.to_owned())),
        }
    }
}
