//! Block size selection

/// Smallest block size used for files that go through the parallel path (4 KiB)
pub const MIN_BLOCK_SIZE: u64 = 4096;

/// Largest block size (1 MiB)
pub const MAX_BLOCK_SIZE: u64 = 1024 * 1024;

/// Pick the chunk length used for every read/write of a copy.
///
/// Files below [`MIN_BLOCK_SIZE`] are copied as a single block, so the file
/// size itself is returned. Otherwise the file is divided evenly over
/// `worker_budget_max` workers, the share is rounded down to its highest set
/// bit and clamped to `[MIN_BLOCK_SIZE, MAX_BLOCK_SIZE]`.
pub fn compute_block_size(file_size: u64, worker_budget_max: usize) -> u64 {
    if file_size < MIN_BLOCK_SIZE {
        return file_size;
    }

    let budget = worker_budget_max.max(1) as u64;
    let candidate = file_size.div_ceil(budget);

    highest_power_of_two(candidate).clamp(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE)
}

/// Keep only the highest set bit of `n` (`n > 0`)
fn highest_power_of_two(n: u64) -> u64 {
    1u64 << (u64::BITS - 1 - n.leading_zeros())
}
