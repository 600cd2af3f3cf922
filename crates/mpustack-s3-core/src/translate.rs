//! Translation of a caller's put configuration into per-request options.
//!
//! A multipart upload sends two kinds of requests that accept options: the
//! initiate request, which fixes the properties of the final object, and the
//! part requests, which only carry bytes. Providers reject encryption or ACL
//! headers on part requests, so part options are always the defaults.

use mpustack_s3_model::{PutConfiguration, UploadOptions};
use tracing::trace;

/// The option sets for the two kinds of multipart requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatedOptions {
    main: UploadOptions,
    part: UploadOptions,
}

impl TranslatedOptions {
    /// Options for the initiate request (and for a single put).
    #[must_use]
    pub fn main_options(&self) -> &UploadOptions {
        &self.main
    }

    /// Options for every part request. Always the defaults.
    #[must_use]
    pub fn part_options(&self) -> &UploadOptions {
        &self.part
    }
}

/// Derive the main and part option sets from an optional put configuration.
///
/// Without a configuration, or with one from a dialect that cannot express
/// encryption, both sets are the defaults. Otherwise the main set carries the
/// encryption algorithm, ACL, and storage class of the configuration.
///
/// # Examples
///
/// ```
/// use mpustack_s3_core::translate;
/// use mpustack_s3_model::PutConfiguration;
///
/// let config = PutConfiguration::builder()
///     .multipart()
///     .server_side_encryption()
///     .build()
///     .unwrap();
/// let options = translate(Some(&config));
///
/// assert_eq!(options.main_options().server_side_encryption_algorithm(), Some("AES256"));
/// assert!(!options.part_options().uses_server_side_encryption());
/// ```
#[must_use]
pub fn translate(config: Option<&PutConfiguration>) -> TranslatedOptions {
    let Some(config) = config.filter(|c| c.is_encryption_aware()) else {
        return TranslatedOptions::default();
    };

    let main = UploadOptions::new(
        config.server_side_encryption().cloned(),
        config.acl(),
        config.storage_class(),
    );
    trace!(
        dialect = %config.dialect(),
        sse = ?main.server_side_encryption_algorithm(),
        acl = %main.acl(),
        storage_class = %main.storage_class(),
        "translated put configuration"
    );

    TranslatedOptions {
        main,
        part: UploadOptions::default(),
    }
}
