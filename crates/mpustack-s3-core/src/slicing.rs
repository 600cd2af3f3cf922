//! Part geometry for multipart uploads.
//!
//! Given a payload length, [`SlicingAlgorithm::plan`] decides whether a
//! multipart upload is worthwhile and, if so, the chunk size and number of
//! parts:
//!
//! 1. Payloads no larger than the default part size are not split
//!    (`part_count == 0`, single put).
//! 2. If the default part size yields at most `part_count_ceiling` parts,
//!    the default part size is used.
//! 3. Otherwise the chunk size grows in whole multiples of the default part
//!    size until the part count fits under the ceiling, capped at the
//!    maximum part size. Once capped, the part count keeps growing up to the
//!    provider's hard limit.
//!
//! Every part except the last is exactly `chunk_size` bytes; the last part
//! holds the remainder and is never empty.

use mpustack_core::{MpuConfig, MpuStackResult};
use tracing::debug;

use crate::error::UploadError;

/// Chooses chunk size and part count for a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicingAlgorithm {
    part_size: u64,
    part_count_ceiling: u32,
    max_part_size: u64,
    max_part_count: u32,
}

impl Default for SlicingAlgorithm {
    fn default() -> Self {
        let config = MpuConfig::default();
        Self {
            part_size: config.part_size,
            part_count_ceiling: config.part_count_ceiling,
            max_part_size: config.max_part_size,
            max_part_count: config.max_part_count,
        }
    }
}

impl SlicingAlgorithm {
    /// Create an algorithm from a validated engine configuration.
    pub fn new(config: &MpuConfig) -> MpuStackResult<Self> {
        config.validate()?;
        Ok(Self {
            part_size: config.part_size,
            part_count_ceiling: config.part_count_ceiling,
            max_part_size: config.max_part_size,
            max_part_count: config.max_part_count,
        })
    }

    /// The default part size, which is also the multipart threshold.
    #[must_use]
    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    /// The largest payload this algorithm can plan.
    #[must_use]
    pub fn max_object_size(&self) -> u64 {
        self.max_part_size
            .saturating_mul(u64::from(self.max_part_count))
    }

    /// Plan the upload of `total_length` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::EntityTooLarge`] if the payload cannot fit in
    /// `max_part_count` parts of at most `max_part_size` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpustack_s3_core::SlicingAlgorithm;
    ///
    /// const MIB: u64 = 1024 * 1024;
    /// let plan = SlicingAlgorithm::default().plan(100 * MIB).unwrap();
    ///
    /// assert_eq!(plan.chunk_size(), 32 * MIB);
    /// assert_eq!(plan.part_count(), 4);
    /// assert_eq!(plan.last_part_size(), 4 * MIB);
    /// ```
    pub fn plan(&self, total_length: u64) -> Result<SlicingPlan, UploadError> {
        if total_length <= self.part_size {
            debug!(
                length = total_length,
                threshold = self.part_size,
                "payload below multipart threshold"
            );
            return Ok(SlicingPlan {
                total_length,
                chunk_size: self.part_size,
                part_count: 0,
            });
        }

        let max = self.max_object_size();
        if total_length > max {
            return Err(UploadError::EntityTooLarge {
                length: total_length,
                max,
            });
        }

        let default_parts = total_length.div_ceil(self.part_size);
        let chunk_size = if default_parts <= u64::from(self.part_count_ceiling) {
            self.part_size
        } else {
            let multiple = default_parts.div_ceil(u64::from(self.part_count_ceiling));
            multiple
                .saturating_mul(self.part_size)
                .min(self.max_part_size)
        };

        let parts = total_length.div_ceil(chunk_size);
        let part_count = u32::try_from(parts)
            .ok()
            .filter(|count| *count <= self.max_part_count)
            .ok_or(UploadError::EntityTooLarge {
                length: total_length,
                max,
            })?;

        let plan = SlicingPlan {
            total_length,
            chunk_size,
            part_count,
        };
        debug!(
            length = total_length,
            chunk_size,
            part_count,
            last_part_size = plan.last_part_size(),
            "partitioned payload"
        );
        Ok(plan)
    }
}

/// The outcome of [`SlicingAlgorithm::plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicingPlan {
    total_length: u64,
    chunk_size: u64,
    part_count: u32,
}

impl SlicingPlan {
    /// The payload length this plan covers.
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Size of every part except the last.
    #[must_use]
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Number of parts; zero means a single put.
    #[must_use]
    pub fn part_count(&self) -> u32 {
        self.part_count
    }

    /// Whether the payload goes up as one object without multipart.
    #[must_use]
    pub fn is_single_part(&self) -> bool {
        self.part_count == 0
    }

    /// Size of the final part (the whole payload for a single put).
    #[must_use]
    pub fn last_part_size(&self) -> u64 {
        if self.part_count == 0 {
            return self.total_length;
        }
        self.total_length - self.chunk_size * u64::from(self.part_count - 1)
    }

    /// Size of part `part_number` (1-based), or `None` if out of range.
    #[must_use]
    pub fn part_size(&self, part_number: u32) -> Option<u64> {
        match part_number {
            0 => None,
            n if n < self.part_count => Some(self.chunk_size),
            n if n == self.part_count => Some(self.last_part_size()),
            _ => None,
        }
    }

    /// Iterate over the sizes of all parts in order.
    pub fn part_sizes(&self) -> impl Iterator<Item = u64> + '_ {
        (1..=self.part_count).filter_map(|n| self.part_size(n))
    }

    /// A cursor yielding part numbers and offsets in upload order.
    #[must_use]
    pub fn cursor(&self) -> PartCursor {
        PartCursor {
            chunk_size: self.chunk_size,
            next_part: 1,
            next_offset: 0,
        }
    }
}

/// Yields consecutive part numbers (from 1) and byte offsets (from 0).
///
/// Part numbers and offsets advance independently, each by one step per
/// call, so callers pair one [`next_part`](Self::next_part) with one
/// [`next_offset`](Self::next_offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartCursor {
    chunk_size: u64,
    next_part: u32,
    next_offset: u64,
}

impl PartCursor {
    /// Return the next part number and advance.
    pub fn next_part(&mut self) -> u32 {
        let part = self.next_part;
        self.next_part += 1;
        part
    }

    /// Return the next byte offset and advance by one chunk.
    pub fn next_offset(&mut self) -> u64 {
        let offset = self.next_offset;
        self.next_offset += self.chunk_size;
        offset
    }
}
