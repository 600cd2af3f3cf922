//! Put configurations and per-request upload options.

use std::fmt;

use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::ModelError;
use crate::types::{CannedAcl, ServerSideEncryption, StorageClass};

// ---------------------------------------------------------------------------
// Dialect
// ---------------------------------------------------------------------------

/// The option dialect a [`PutConfiguration`] was built in.
///
/// Each dialect is a fixed capability set. Setting an option the dialect
/// cannot express fails at build time.
///
/// | Dialect | SSE | named algorithm | ACL | storage class |
/// |---------|-----|-----------------|-----|---------------|
/// | `Generic` | - | - | - | - |
/// | `EncryptionFlag` | yes (`AES256`) | - | yes | - |
/// | `NamedAlgorithm` | yes | yes | yes | - |
/// | `StorageClassAware` | yes | yes | yes | yes |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dialect {
    /// Provider-agnostic: only the multipart switch.
    Generic,
    /// Server-side encryption as an on/off flag.
    EncryptionFlag,
    /// Server-side encryption with a named algorithm.
    #[default]
    NamedAlgorithm,
    /// Named-algorithm encryption plus storage class selection.
    StorageClassAware,
}

impl Dialect {
    /// Whether server-side encryption can be requested at all.
    #[must_use]
    pub fn supports_encryption(self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// Whether an algorithm other than `AES256` can be named.
    #[must_use]
    pub fn supports_named_algorithm(self) -> bool {
        matches!(self, Self::NamedAlgorithm | Self::StorageClassAware)
    }

    /// Whether an access policy can be set.
    #[must_use]
    pub fn supports_acl(self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// Whether a storage class can be set.
    #[must_use]
    pub fn supports_storage_class(self) -> bool {
        matches!(self, Self::StorageClassAware)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::EncryptionFlag => "encryption-flag",
            Self::NamedAlgorithm => "named-algorithm",
            Self::StorageClassAware => "storage-class-aware",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PutConfiguration
// ---------------------------------------------------------------------------

/// Immutable description of how a put should be performed.
///
/// # Examples
///
/// ```
/// use mpustack_s3_model::{CannedAcl, PutConfiguration};
///
/// let config = PutConfiguration::builder()
///     .multipart()
///     .server_side_encryption_algorithm("aws:kms")
///     .acl(CannedAcl::AuthenticatedRead)
///     .build()
///     .unwrap();
///
/// assert!(config.multipart());
/// assert!(config.uses_server_side_encryption());
/// assert_eq!(config.server_side_encryption_algorithm(), Some("aws:kms"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutConfiguration {
    dialect: Dialect,
    multipart: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_side_encryption: Option<ServerSideEncryption>,
    acl: CannedAcl,
    storage_class: StorageClass,
}

impl PutConfiguration {
    /// Start building a configuration in the default (named-algorithm) dialect.
    #[must_use]
    pub fn builder() -> PutConfigurationBuilder {
        PutConfigurationBuilder::new(Dialect::default())
    }

    /// Start building a configuration in a specific dialect.
    #[must_use]
    pub fn builder_for(dialect: Dialect) -> PutConfigurationBuilder {
        PutConfigurationBuilder::new(dialect)
    }

    /// A generic configuration carrying nothing but the multipart switch.
    #[must_use]
    pub fn generic(multipart: bool) -> Self {
        Self {
            dialect: Dialect::Generic,
            multipart,
            ..Self::default()
        }
    }

    /// The dialect this configuration was built in.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether the dialect can carry server-side encryption.
    #[must_use]
    pub fn is_encryption_aware(&self) -> bool {
        self.dialect.supports_encryption()
    }

    /// Whether the put should go through the multipart protocol.
    #[must_use]
    pub fn multipart(&self) -> bool {
        self.multipart
    }

    /// Whether server-side encryption was requested.
    #[must_use]
    pub fn uses_server_side_encryption(&self) -> bool {
        self.server_side_encryption.is_some()
    }

    /// The requested encryption algorithm, if any.
    #[must_use]
    pub fn server_side_encryption_algorithm(&self) -> Option<&str> {
        self.server_side_encryption
            .as_ref()
            .map(ServerSideEncryption::as_str)
    }

    /// The requested encryption, if any.
    #[must_use]
    pub fn server_side_encryption(&self) -> Option<&ServerSideEncryption> {
        self.server_side_encryption.as_ref()
    }

    /// The access policy for the final object.
    #[must_use]
    pub fn acl(&self) -> CannedAcl {
        self.acl
    }

    /// The storage class for the final object.
    #[must_use]
    pub fn storage_class(&self) -> StorageClass {
        self.storage_class
    }
}

/// How encryption was last requested on a builder.
#[derive(Debug, Clone)]
enum EncryptionRequest {
    Flag,
    Named(String),
}

/// Fluent builder for [`PutConfiguration`].
///
/// Setters may be called repeatedly; the last value wins. Everything is
/// validated once, in [`PutConfigurationBuilder::build`].
#[derive(Debug, Clone)]
pub struct PutConfigurationBuilder {
    dialect: Dialect,
    multipart: bool,
    encryption: Option<EncryptionRequest>,
    acl: Option<CannedAcl>,
    storage_class: Option<StorageClass>,
}

impl PutConfigurationBuilder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            multipart: false,
            encryption: None,
            acl: None,
            storage_class: None,
        }
    }

    /// Switch the dialect the configuration is validated against.
    #[must_use]
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Request a multipart upload.
    #[must_use]
    pub fn multipart(mut self) -> Self {
        self.multipart = true;
        self
    }

    /// Request server-side encryption with the default `AES256` algorithm.
    #[must_use]
    pub fn server_side_encryption(mut self) -> Self {
        self.encryption = Some(EncryptionRequest::Flag);
        self
    }

    /// Request server-side encryption with a named algorithm.
    #[must_use]
    pub fn server_side_encryption_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.encryption = Some(EncryptionRequest::Named(algorithm.into()));
        self
    }

    /// Set the access policy.
    #[must_use]
    pub fn acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Set the storage class.
    #[must_use]
    pub fn storage_class(mut self, storage_class: StorageClass) -> Self {
        self.storage_class = Some(storage_class);
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<PutConfiguration, ModelError> {
        let dialect = self.dialect;

        let server_side_encryption = match self.encryption {
            None => None,
            Some(_) if !dialect.supports_encryption() => {
                return Err(ModelError::invalid_configuration(format!(
                    "the {dialect} dialect cannot request server-side encryption"
                )));
            }
            Some(EncryptionRequest::Flag) => Some(ServerSideEncryption::aes256()),
            Some(EncryptionRequest::Named(name)) => {
                let sse = ServerSideEncryption::new(name)?;
                if !dialect.supports_named_algorithm() && sse.as_str() != ServerSideEncryption::AES256
                {
                    return Err(ModelError::invalid_configuration(format!(
                        "the {dialect} dialect only supports {}, got {sse}",
                        ServerSideEncryption::AES256
                    )));
                }
                Some(sse)
            }
        };

        if self.acl.is_some() && !dialect.supports_acl() {
            return Err(ModelError::invalid_configuration(format!(
                "the {dialect} dialect cannot set an access policy"
            )));
        }
        if self.storage_class.is_some() && !dialect.supports_storage_class() {
            return Err(ModelError::invalid_configuration(format!(
                "the {dialect} dialect cannot set a storage class"
            )));
        }

        Ok(PutConfiguration {
            dialect,
            multipart: self.multipart,
            server_side_encryption,
            acl: self.acl.unwrap_or_default(),
            storage_class: self.storage_class.unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// UploadOptions
// ---------------------------------------------------------------------------

/// Options attached to a single wire request.
///
/// The default value is what the provider assumes when no option headers
/// are sent: no encryption, `private`, `STANDARD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    server_side_encryption: Option<ServerSideEncryption>,
    #[builder(default)]
    acl: CannedAcl,
    #[builder(default)]
    storage_class: StorageClass,
}

impl UploadOptions {
    /// Create an option set from its parts.
    #[must_use]
    pub fn new(
        server_side_encryption: Option<ServerSideEncryption>,
        acl: CannedAcl,
        storage_class: StorageClass,
    ) -> Self {
        Self {
            server_side_encryption,
            acl,
            storage_class,
        }
    }

    /// Whether this request asks for server-side encryption.
    #[must_use]
    pub fn uses_server_side_encryption(&self) -> bool {
        self.server_side_encryption.is_some()
    }

    /// The encryption algorithm sent with this request, if any.
    #[must_use]
    pub fn server_side_encryption_algorithm(&self) -> Option<&str> {
        self.server_side_encryption
            .as_ref()
            .map(ServerSideEncryption::as_str)
    }

    /// The access policy sent with this request.
    #[must_use]
    pub fn acl(&self) -> CannedAcl {
        self.acl
    }

    /// The storage class sent with this request.
    #[must_use]
    pub fn storage_class(&self) -> StorageClass {
        self.storage_class
    }

    /// Whether this option set equals the provider defaults.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Render the request headers, substituting `header_tag` into `x-{tag}-*`.
    ///
    /// Defaults are not rendered: a `private` ACL or `STANDARD` storage class
    /// produces no header.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpustack_s3_model::{ServerSideEncryption, UploadOptions};
    ///
    /// let options = UploadOptions::builder()
    ///     .server_side_encryption(ServerSideEncryption::aes256())
    ///     .build();
    /// let headers = options.request_headers("amz").unwrap();
    /// assert_eq!(headers["x-amz-server-side-encryption"], "AES256");
    /// assert_eq!(headers.len(), 1);
    /// ```
    pub fn request_headers(&self, header_tag: &str) -> Result<HeaderMap, ModelError> {
        let mut headers = HeaderMap::new();
        if let Some(sse) = &self.server_side_encryption {
            insert_header(&mut headers, header_tag, "server-side-encryption", sse.as_str())?;
        }
        if self.acl != CannedAcl::Private {
            insert_header(&mut headers, header_tag, "acl", self.acl.as_str())?;
        }
        if self.storage_class != StorageClass::Standard {
            insert_header(
                &mut headers,
                header_tag,
                "storage-class",
                self.storage_class.as_str(),
            )?;
        }
        Ok(headers)
    }
}

fn insert_header(
    headers: &mut HeaderMap,
    header_tag: &str,
    suffix: &str,
    value: &str,
) -> Result<(), ModelError> {
    let name = format!("x-{header_tag}-{suffix}");
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| ModelError::InvalidHeader {
            name: name.clone(),
            message: e.to_string(),
        })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| ModelError::InvalidHeader {
        name: name.clone(),
        message: e.to_string(),
    })?;
    headers.insert(header_name, header_value);
    Ok(())
}
