//! Partitioning of the block-aligned prefix into worker ranges

use serde::{Deserialize, Serialize};

/// Half-open span of block indices handled by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRange {
    /// First block index (inclusive)
    pub start_block: u64,
    /// Last block index (exclusive)
    pub end_block: u64,
}

impl CopyRange {
    /// Create a new range
    pub fn new(start_block: u64, end_block: u64) -> Self {
        Self { start_block, end_block }
    }

    /// Byte offsets `[start, end)` covered by the range
    pub fn byte_span(&self, block_size: u64) -> (u64, u64) {
        (self.start_block * block_size, self.end_block * block_size)
    }
}

/// Split `[0, total_blocks)` into contiguous ranges of
/// `total_blocks / worker_count` blocks.
///
/// The cursor advances by exactly one range length, so consecutive ranges
/// share a boundary and the result tiles the prefix with no gap. When the
/// division leaves a remainder the last range is shorter.
pub fn plan_ranges(total_blocks: u64, worker_count: usize) -> Vec<CopyRange> {
    if total_blocks == 0 {
        return Vec::new();
    }

    let blocks_per_worker = (total_blocks / worker_count.max(1) as u64).max(1);
    let mut ranges = Vec::with_capacity((total_blocks / blocks_per_worker + 1) as usize);

    let mut start = 0u64;
    while start < total_blocks {
        let end = (start + blocks_per_worker).min(total_blocks);
        ranges.push(CopyRange::new(start, end));
        start += blocks_per_worker;
    }

    ranges
}
