//! ETag computation for stored objects and parts.

use digest::Digest;

/// Compute the hex-encoded MD5 digest of `data`.
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(md5::Md5::digest(data))
}

/// Compute the quoted hex MD5 of `data`, as a part or single-put ETag.
///
/// # Examples
///
/// ```
/// use mpustack_s3_core::checksums::compute_etag;
///
/// assert_eq!(compute_etag(b""), "\"d41d8cd98f00b204e9800998ecf8427e\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}

/// Compute the composite ETag of a completed multipart upload.
///
/// The result is the MD5 of the concatenated binary part digests, formatted
/// as `"<hex>-<part_count>"`. Quotes around the inputs are ignored.
///
/// # Examples
///
/// ```
/// use mpustack_s3_core::checksums::{compute_etag, compute_multipart_etag};
///
/// let parts = [compute_etag(b"first"), compute_etag(b"second")];
/// assert!(compute_multipart_etag(&parts).ends_with("-2\""));
/// ```
#[must_use]
pub fn compute_multipart_etag(part_etags: &[impl AsRef<str>]) -> String {
    let mut combined = Vec::with_capacity(part_etags.len() * 16);
    for etag in part_etags {
        if let Ok(bytes) = hex::decode(etag.as_ref().trim_matches('"')) {
            combined.extend_from_slice(&bytes);
        }
    }
    format!(
        "\"{}-{}\"",
        hex::encode(md5::Md5::digest(&combined)),
        part_etags.len()
    )
}
