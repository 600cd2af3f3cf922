//! Engine configuration.
//!
//! Provides [`MpuConfig`], the knobs that drive part sizing and wire header
//! rendering. Values are loaded from environment variables, with defaults
//! matching the limits of the S3 multipart protocol.

use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::error::{MpuStackError, MpuStackResult};

/// Default chunk size targeted by the slicing algorithm (32 MiB).
pub const DEFAULT_PART_SIZE: u64 = 32 * 1024 * 1024;

/// Number of parts the slicing algorithm allows before it starts growing the
/// chunk size instead of the part count.
pub const DEFAULT_PART_COUNT_CEILING: u32 = 100;

/// Smallest part (other than the last one) accepted by the service (5 MiB).
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Largest part accepted by the service (5 GiB).
pub const MAX_PART_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Largest part number accepted by the service.
pub const MAX_PART_COUNT: u32 = 10_000;

/// Vendor tag substituted into `x-{tag}-*` request headers.
pub const DEFAULT_HEADER_TAG: &str = "amz";

/// Upload engine configuration.
///
/// # Examples
///
/// ```
/// use mpustack_core::MpuConfig;
///
/// let config = MpuConfig::default();
/// assert_eq!(config.part_size, 32 * 1024 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct MpuConfig {
    /// Target chunk size in bytes; payloads up to this size skip multipart.
    #[builder(default = DEFAULT_PART_SIZE)]
    pub part_size: u64,

    /// Soft part-count ceiling for the first growth phase.
    #[builder(default = DEFAULT_PART_COUNT_CEILING)]
    pub part_count_ceiling: u32,

    /// Minimum size of a non-final part.
    #[builder(default = MIN_PART_SIZE)]
    pub min_part_size: u64,

    /// Maximum size of any part.
    #[builder(default = MAX_PART_SIZE)]
    pub max_part_size: u64,

    /// Hard cap on the number of parts in one upload.
    #[builder(default = MAX_PART_COUNT)]
    pub max_part_count: u32,

    /// Header tag used when rendering `x-{tag}-*` headers.
    #[builder(default = String::from(DEFAULT_HEADER_TAG))]
    pub header_tag: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for MpuConfig {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            part_count_ceiling: DEFAULT_PART_COUNT_CEILING,
            min_part_size: MIN_PART_SIZE,
            max_part_size: MAX_PART_SIZE,
            max_part_count: MAX_PART_COUNT,
            header_tag: String::from(DEFAULT_HEADER_TAG),
            log_level: String::from("info"),
        }
    }
}

impl MpuConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `MPU_PART_SIZE` | `33554432` |
    /// | `MPU_PART_COUNT_CEILING` | `100` |
    /// | `MPU_MIN_PART_SIZE` | `5242880` |
    /// | `MPU_MAX_PART_SIZE` | `5368709120` |
    /// | `MPU_MAX_PART_COUNT` | `10000` |
    /// | `MPU_HEADER_TAG` | `amz` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Unparseable numeric values are ignored and the default is kept.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(n) = env_number("MPU_PART_SIZE") {
            config.part_size = n;
        }
        if let Some(n) = env_number("MPU_PART_COUNT_CEILING") {
            config.part_count_ceiling = n;
        }
        if let Some(n) = env_number("MPU_MIN_PART_SIZE") {
            config.min_part_size = n;
        }
        if let Some(n) = env_number("MPU_MAX_PART_SIZE") {
            config.max_part_size = n;
        }
        if let Some(n) = env_number("MPU_MAX_PART_COUNT") {
            config.max_part_count = n;
        }
        if let Ok(v) = std::env::var("MPU_HEADER_TAG") {
            config.header_tag = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Check that the sizing limits are mutually consistent.
    pub fn validate(&self) -> MpuStackResult<()> {
        if self.min_part_size == 0 || self.part_size < self.min_part_size {
            return Err(MpuStackError::Config(format!(
                "part size {} must be at least the minimum part size {}",
                self.part_size, self.min_part_size
            )));
        }
        if self.part_size > self.max_part_size {
            return Err(MpuStackError::Config(format!(
                "part size {} exceeds the maximum part size {}",
                self.part_size, self.max_part_size
            )));
        }
        if self.max_part_count == 0 || self.max_part_count > MAX_PART_COUNT {
            return Err(MpuStackError::Config(format!(
                "maximum part count must be between 1 and {MAX_PART_COUNT}, got {}",
                self.max_part_count
            )));
        }
        if self.part_count_ceiling == 0 || self.part_count_ceiling > self.max_part_count {
            return Err(MpuStackError::Config(format!(
                "part count ceiling must be between 1 and {}, got {}",
                self.max_part_count, self.part_count_ceiling
            )));
        }
        if self.header_tag.is_empty() || !self.header_tag.bytes().all(|b| b.is_ascii_lowercase())
        {
            return Err(MpuStackError::Config(format!(
                "header tag must be lowercase ASCII letters, got {:?}",
                self.header_tag
            )));
        }
        Ok(())
    }

    /// Largest payload that can be uploaded within the configured limits.
    #[must_use]
    pub fn max_object_size(&self) -> u64 {
        self.max_part_size
            .saturating_mul(u64::from(self.max_part_count))
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    if let Ok(n) = raw.trim().parse() {
        Some(n)
    } else {
        warn!(name, value = %raw, "ignoring unparseable environment variable");
        None
    }
}
