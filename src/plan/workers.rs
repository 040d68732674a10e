//! Worker count heuristic

/// Number of blocks a worker should have before adding another is worth it
pub const TARGET_BLOCKS_PER_WORKER: u64 = 100;

/// Default ceiling on concurrent workers
pub const DEFAULT_MAX_WORKERS: usize = 50;

/// Default floor on concurrent workers
pub const DEFAULT_MIN_WORKERS: usize = 1;

/// Derive how many workers to use for `total_blocks` blocks.
///
/// Starting at `max_workers`, the count is halved until every worker would
/// get at least [`TARGET_BLOCKS_PER_WORKER`] blocks. The count never drops
/// below `min_workers` (itself at least 1); reaching the floor ends the
/// search whatever the ratio.
pub fn compute_worker_count(total_blocks: u64, min_workers: usize, max_workers: usize) -> usize {
    let min_workers = min_workers.max(1);
    let mut current = max_workers.max(min_workers);

    loop {
        if total_blocks >= TARGET_BLOCKS_PER_WORKER.saturating_mul(current as u64) {
            return current;
        }
        if current == min_workers {
            return min_workers;
        }
        current = (current / 2).max(min_workers);
    }
}
