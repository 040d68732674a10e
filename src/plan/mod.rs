//! Copy planning
//!
//! Turns a file size and a worker budget into a concrete plan: block size,
//! worker count and the ranges each worker copies. Planning is pure; no
//! file is touched here.

mod block;
mod ranges;
mod workers;

pub use block::*;
pub use ranges::*;
pub use workers::*;

use serde::Serialize;

/// Bounds on the number of concurrent workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerBudget {
    /// Minimum worker count (at least 1)
    pub min: usize,
    /// Maximum worker count
    pub max: usize,
}

impl WorkerBudget {
    /// Create a budget, raising `min` to 1 and `max` to `min` if needed
    pub fn new(min: usize, max: usize) -> Self {
        let min = min.max(1);
        Self { min, max: max.max(min) }
    }
}

impl Default for WorkerBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WORKERS, DEFAULT_MAX_WORKERS)
    }
}

/// How a file of a given size will be copied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CopyPlan {
    /// Zero-length source: only the destination is created
    Empty,
    /// Source below the minimum block size, copied in one read/write
    SingleBlock {
        /// File size in bytes
        len: u64,
    },
    /// Block-aligned prefix split over workers, tail copied afterwards
    Parallel {
        /// File size in bytes
        file_size: u64,
        /// Chunk length for every read/write
        block_size: u64,
        /// Full blocks in the file
        total_blocks: u64,
        /// Pool size
        worker_count: usize,
        /// Ranges tiling `[0, total_blocks)`
        ranges: Vec<CopyRange>,
    },
}

impl CopyPlan {
    /// Build the plan for a file of `file_size` bytes
    pub fn for_size(file_size: u64, budget: WorkerBudget) -> Self {
        if file_size == 0 {
            return Self::Empty;
        }

        if file_size < MIN_BLOCK_SIZE {
            return Self::SingleBlock { len: file_size };
        }

        let block_size = compute_block_size(file_size, budget.max);
        let total_blocks = file_size / block_size;
        let worker_count = compute_worker_count(total_blocks, budget.min, budget.max);
        let ranges = plan_ranges(total_blocks, worker_count);

        Self::Parallel {
            file_size,
            block_size,
            total_blocks,
            worker_count,
            ranges,
        }
    }

    /// Total bytes the plan copies
    pub fn file_size(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::SingleBlock { len } => *len,
            Self::Parallel { file_size, .. } => *file_size,
        }
    }

    /// Chunk length used for transfers
    pub fn block_size(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::SingleBlock { len } => *len,
            Self::Parallel { block_size, .. } => *block_size,
        }
    }

    /// Number of workers that run concurrently
    pub fn worker_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::SingleBlock { .. } => 1,
            Self::Parallel { worker_count, .. } => *worker_count,
        }
    }

    /// Ranges copied concurrently (empty unless parallel)
    pub fn ranges(&self) -> &[CopyRange] {
        match self {
            Self::Parallel { ranges, .. } => ranges,
            _ => &[],
        }
    }

    /// Bytes covered by the concurrent phase
    pub fn aligned_len(&self) -> u64 {
        match self {
            Self::Parallel {
                block_size,
                total_blocks,
                ..
            } => block_size * total_blocks,
            _ => 0,
        }
    }

    /// Bytes left after the last full block, copied sequentially
    pub fn tail_len(&self) -> u64 {
        match self {
            Self::Parallel { file_size, .. } => file_size - self.aligned_len(),
            _ => 0,
        }
    }

    /// Print the plan to stdout (dry-run output)
    pub fn print_summary(&self) {
        println!("=== Copy Plan ===");
        println!("File size:       {}", humansize::format_size(self.file_size(), humansize::BINARY));
        match self {
            Self::Empty => println!("Strategy:        empty file"),
            Self::SingleBlock { .. } => println!("Strategy:        single block"),
            Self::Parallel {
                block_size,
                total_blocks,
                worker_count,
                ranges,
                ..
            } => {
                println!("Strategy:        parallel ranges");
                println!("Block size:      {}", humansize::format_size(*block_size, humansize::BINARY));
                println!("Total blocks:    {}", total_blocks);
                println!("Workers:         {}", worker_count);
                println!("Ranges:          {}", ranges.len());
                println!("Tail:            {} bytes", self.tail_len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_plan() {
        let plan = CopyPlan::for_size(1_000_000, WorkerBudget::default());
        match &plan {
            CopyPlan::Parallel {
                block_size,
                total_blocks,
                worker_count,
                ranges,
                ..
            } => {
                assert_eq!(*block_size, 16384);
                assert_eq!(*total_blocks, 61);
                assert_eq!(*worker_count, 1);
                assert_eq!(ranges, &vec![CopyRange::new(0, 61)]);
            }
            other => panic!("expected parallel plan, got {:?}", other),
        }
        assert_eq!(plan.tail_len(), 576);
    }

    #[test]
    fn test_small_file_plan() {
        let plan = CopyPlan::for_size(100, WorkerBudget::default());
        assert_eq!(plan, CopyPlan::SingleBlock { len: 100 });
        assert!(plan.ranges().is_empty());
        assert_eq!(plan.tail_len(), 0);
    }

    #[test]
    fn test_empty_plan() {
        let plan = CopyPlan::for_size(0, WorkerBudget::default());
        assert_eq!(plan, CopyPlan::Empty);
        assert_eq!(plan.worker_count(), 0);
    }

    #[test]
    fn test_exact_min_block_is_parallel() {
        let plan = CopyPlan::for_size(MIN_BLOCK_SIZE, WorkerBudget::default());
        assert_eq!(plan.block_size(), MIN_BLOCK_SIZE);
        assert_eq!(plan.ranges(), &[CopyRange::new(0, 1)]);
        assert_eq!(plan.tail_len(), 0);
    }

    #[test]
    fn test_large_file_clamps_block_size() {
        // 1 GiB / 50 clamps to 1 MiB blocks; 1024 blocks settle on 6 workers
        let plan = CopyPlan::for_size(1024 * 1024 * 1024, WorkerBudget::default());
        assert_eq!(plan.block_size(), MAX_BLOCK_SIZE);
        assert_eq!(plan.worker_count(), 6);
        // 6 x 170 blocks plus a 4-block remainder range
        assert_eq!(plan.ranges().len(), 7);
        assert_eq!(plan.ranges()[6], CopyRange::new(1020, 1024));
    }

    #[test]
    fn test_budget_normalized() {
        let budget = WorkerBudget::new(0, 0);
        assert_eq!(budget, WorkerBudget { min: 1, max: 1 });
    }

    proptest! {
        #[test]
        fn prop_tail_completes_file(file_size in 0u64..(64 * 1024 * 1024), max in 1usize..=64) {
            let plan = CopyPlan::for_size(file_size, WorkerBudget::new(1, max));
            let covered = match &plan {
                CopyPlan::Empty => 0,
                CopyPlan::SingleBlock { len } => *len,
                CopyPlan::Parallel { .. } => plan.aligned_len() + plan.tail_len(),
            };
            prop_assert_eq!(covered, file_size);
            prop_assert!(plan.tail_len() < plan.block_size().max(1));
        }
    }
}
