//! Parallel copy executor
//!
//! Opens the source and destination once, plans the copy, runs one range
//! copy per planned range on a bounded rayon pool, waits for every range,
//! then copies the unaligned tail on the calling thread.
//!
//! A failed run leaves whatever was already written in the destination;
//! no cleanup is attempted.

use crate::config::CopyConfig;
use crate::core::io::{ReadAt, WriteAt};
use crate::core::range::RangeCopier;
use crate::error::{first_error, IoResultExt, PcopyError, Result};
use crate::fs::validate_paths;
use crate::hash::{verify_files_match, VerificationResult};
use crate::plan::{CopyPlan, CopyRange};
use crate::progress::ProgressReporter;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of a successful copy
#[derive(Debug, Serialize)]
pub struct CopyReport {
    /// Source file
    pub source: PathBuf,
    /// Destination file
    pub destination: PathBuf,
    /// Plan that was executed
    pub plan: CopyPlan,
    /// Total bytes written to the destination
    pub bytes_copied: u64,
    /// Ranges copied in the concurrent phase
    pub ranges_copied: usize,
    /// Wall-clock duration
    pub duration: Duration,
    /// Average throughput in bytes/second
    pub throughput: f64,
    /// Verification result (if enabled)
    pub verification: Option<VerificationResult>,
}

impl CopyReport {
    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n=== Copy Summary ===");
        println!("Source:          {}", self.source.display());
        println!("Destination:     {}", self.destination.display());
        println!("Bytes copied:    {}", humansize::format_size(self.bytes_copied, humansize::BINARY));
        println!("Block size:      {}", humansize::format_size(self.plan.block_size(), humansize::BINARY));
        println!("Workers:         {}", self.plan.worker_count());
        println!("Ranges:          {}", self.ranges_copied);
        println!("Tail:            {} bytes", self.plan.tail_len());
        println!("Duration:        {:.2?}", self.duration);
        println!("Throughput:      {}/s", humansize::format_size(self.throughput as u64, humansize::BINARY));

        if let Some(verification) = &self.verification {
            println!("\nVerification ({}):", verification.source_hash.algorithm.name());
            println!("  Source:      {}", verification.source_hash);
            println!("  Destination: {}", verification.dest_hash);
            println!("  Match:       {}", if verification.matches { "yes" } else { "NO" });
        }
    }

    /// Render the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PcopyError::config(format!("failed to serialize report: {}", e)))
    }
}

/// Copies one file with parallel range workers
pub struct ParallelCopier {
    config: CopyConfig,
    progress: Option<ProgressReporter>,
}

impl ParallelCopier {
    /// Create a new copier
    pub fn new(config: CopyConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Set progress reporter
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Validate the paths and compute the plan without copying anything
    pub fn plan(&self) -> Result<CopyPlan> {
        self.config.validate().map_err(PcopyError::ConfigError)?;
        let file_size = validate_paths(&self.config.source, &self.config.destination)?;
        Ok(CopyPlan::for_size(file_size, self.config.worker_budget()))
    }

    /// Execute the copy
    pub fn execute(&self) -> Result<CopyReport> {
        let result = self.execute_inner();

        if let Some(progress) = &self.progress {
            match &result {
                Ok(_) => progress.finish_success("copy complete"),
                Err(e) => progress.finish_error(&e.to_string()),
            }
        }

        result
    }

    fn execute_inner(&self) -> Result<CopyReport> {
        let start_time = Instant::now();
        let src_path = self.config.source.as_path();
        let dst_path = self.config.destination.as_path();

        self.config.validate().map_err(PcopyError::ConfigError)?;
        validate_paths(src_path, dst_path)?;

        let source = File::open(src_path).with_path(src_path)?;
        let file_size = source.metadata().with_path(src_path)?.len();

        let dest = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(dst_path)
            .with_path(dst_path)?;
        dest.set_len(file_size).with_path(dst_path)?;

        let plan = CopyPlan::for_size(file_size, self.config.worker_budget());
        info!(
            file_size,
            block_size = plan.block_size(),
            workers = plan.worker_count(),
            ranges = plan.ranges().len(),
            tail = plan.tail_len(),
            "copy plan for {}",
            src_path.display()
        );

        if let Some(progress) = &self.progress {
            progress.set_total_bytes(file_size);
        }

        let copier = RangeCopier::new(&source, src_path, &dest, dst_path, plan.block_size())
            .with_progress(self.progress.as_ref());

        let (bytes_copied, ranges_copied) = match &plan {
            CopyPlan::Empty => {
                debug!("empty source, destination created");
                (0, 0)
            }
            CopyPlan::SingleBlock { len } => {
                debug!("single-block copy of {} bytes", len);
                (copier.copy_range(0, *len)?, 0)
            }
            CopyPlan::Parallel {
                file_size,
                block_size,
                worker_count,
                ranges,
                ..
            } => {
                let aligned = copy_ranges(&copier, ranges, *block_size, *worker_count)?;

                let tail_start = plan.aligned_len();
                let tail = copier.copy_range(tail_start, *file_size)?;
                if tail > 0 {
                    debug!(offset = tail_start, len = tail, "tail copied");
                }

                (aligned + tail, ranges.len())
            }
        };

        if self.config.fsync {
            dest.sync_all().with_path(dst_path)?;
        }
        drop(dest);
        drop(source);

        let verification = match self.config.verify {
            Some(algorithm) => {
                if let Some(progress) = &self.progress {
                    progress.set_status("verifying");
                }
                let result = verify_files_match(src_path, dst_path, algorithm)?.into_result(dst_path)?;
                info!(hash = %result.dest_hash, "{} verification passed", algorithm.name());
                Some(result)
            }
            None => None,
        };

        let duration = start_time.elapsed();
        let secs = duration.as_secs_f64();
        let throughput = if secs > 0.0 { bytes_copied as f64 / secs } else { 0.0 };

        Ok(CopyReport {
            source: src_path.to_path_buf(),
            destination: dst_path.to_path_buf(),
            plan,
            bytes_copied,
            ranges_copied,
            duration,
            throughput,
            verification,
        })
    }
}

/// Run every range on a pool of `worker_count` threads and wait for all of
/// them. If any range failed, the first failure in range order is returned
/// once the whole batch is done.
pub fn copy_ranges<R, W>(
    copier: &RangeCopier<'_, R, W>,
    ranges: &[CopyRange],
    block_size: u64,
    worker_count: usize,
) -> Result<u64>
where
    R: ReadAt + Sync + ?Sized,
    W: WriteAt + Sync + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count.max(1))
        .thread_name(|i| format!("pcopy-worker-{}", i))
        .build()
        .map_err(|e| PcopyError::ThreadPoolError(e.to_string()))?;

    let results: Vec<Result<u64>> = pool.install(|| {
        ranges
            .par_iter()
            .map(|range| {
                let (start, end) = range.byte_span(block_size);
                let result = copier.copy_range(start, end);
                match &result {
                    Ok(bytes) => debug!(start, end, bytes, "range copied"),
                    Err(e) => warn!(start, end, "range failed: {}", e),
                }
                result
            })
            .collect()
    });

    match first_error(results) {
        Ok(copied) => Ok(copied.into_iter().sum()),
        Err((e, failed)) => {
            warn!("{} of {} ranges failed", failed, ranges.len());
            Err(e)
        }
    }
}

/// Copy `source` to `dest` with the default worker budget
pub fn parallel_copy(source: &Path, dest: &Path) -> Result<CopyReport> {
    let config = CopyConfig {
        source: source.to_path_buf(),
        destination: dest.to_path_buf(),
        ..Default::default()
    };

    ParallelCopier::new(config).execute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashAlgorithm;
    use crate::plan::plan_ranges;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Deterministic pseudo-random bytes (xorshift64)
    fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed.max(1);
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect()
    }

    fn config_for(dir: &TempDir, max_workers: usize) -> CopyConfig {
        CopyConfig {
            source: dir.path().join("src.bin"),
            destination: dir.path().join("dst.bin"),
            max_workers,
            ..Default::default()
        }
    }

    #[test]
    fn test_roundtrip_million_bytes() {
        let dir = TempDir::new().unwrap();
        let content = random_bytes(1_000_000, 42);
        std::fs::write(dir.path().join("src.bin"), &content).unwrap();

        let report = ParallelCopier::new(config_for(&dir, 50)).execute().unwrap();

        assert_eq!(report.bytes_copied, 1_000_000);
        assert_eq!(report.plan.block_size(), 16384);
        assert_eq!(report.plan.tail_len(), 576);
        assert_eq!(std::fs::read(dir.path().join("dst.bin")).unwrap(), content);
    }

    #[test]
    fn test_roundtrip_many_workers() {
        let dir = TempDir::new().unwrap();
        let content = random_bytes(4 * 1024 * 1024 + 777, 7);
        std::fs::write(dir.path().join("src.bin"), &content).unwrap();

        let copier = ParallelCopier::new(config_for(&dir, 10_000));
        let plan = copier.plan().unwrap();
        assert_eq!(plan.block_size(), 4096);
        assert_eq!(plan.worker_count(), 9);
        assert_eq!(plan.ranges().len(), 10);

        let report = copier.execute().unwrap();
        assert_eq!(report.ranges_copied, 10);
        assert_eq!(report.bytes_copied, content.len() as u64);
        assert_eq!(std::fs::read(dir.path().join("dst.bin")).unwrap(), content);
    }

    #[test]
    fn test_small_file_single_block() {
        let dir = TempDir::new().unwrap();
        let content = random_bytes(100, 3);
        std::fs::write(dir.path().join("src.bin"), &content).unwrap();

        let report = ParallelCopier::new(config_for(&dir, 50)).execute().unwrap();

        assert_eq!(report.plan, CopyPlan::SingleBlock { len: 100 });
        assert_eq!(report.ranges_copied, 0);
        assert_eq!(std::fs::read(dir.path().join("dst.bin")).unwrap(), content);
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("src.bin"), b"").unwrap();

        let report = ParallelCopier::new(config_for(&dir, 50)).execute().unwrap();

        assert_eq!(report.plan, CopyPlan::Empty);
        assert_eq!(report.bytes_copied, 0);
        assert_eq!(std::fs::metadata(dir.path().join("dst.bin")).unwrap().len(), 0);
    }

    #[test]
    fn test_existing_destination_truncated() {
        let dir = TempDir::new().unwrap();
        let content = random_bytes(10_000, 11);
        std::fs::write(dir.path().join("src.bin"), &content).unwrap();
        std::fs::write(dir.path().join("dst.bin"), vec![0xFFu8; 50_000]).unwrap();

        parallel_copy(&dir.path().join("src.bin"), &dir.path().join("dst.bin")).unwrap();

        assert_eq!(std::fs::read(dir.path().join("dst.bin")).unwrap(), content);
    }

    #[test]
    fn test_verify_enabled() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("src.bin"), random_bytes(200_000, 5)).unwrap();

        let config = CopyConfig {
            verify: Some(HashAlgorithm::XXHash3),
            fsync: true,
            ..config_for(&dir, 50)
        };
        let report = ParallelCopier::new(config)
            .with_progress(ProgressReporter::disabled())
            .execute()
            .unwrap();

        let verification = report.verification.as_ref().unwrap();
        assert!(verification.matches);
        assert!(report.to_json().unwrap().contains("\"matches\": true"));
    }

    #[test]
    fn test_missing_source_is_setup_error() {
        let dir = TempDir::new().unwrap();
        let err = ParallelCopier::new(config_for(&dir, 50)).execute().unwrap_err();

        assert!(matches!(err, PcopyError::NotFound(_)));
        assert!(!dir.path().join("dst.bin").exists());
    }

    #[test]
    fn test_invalid_budget_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("src.bin"), b"data").unwrap();

        let err = ParallelCopier::new(config_for(&dir, 0)).execute().unwrap_err();
        assert!(matches!(err, PcopyError::ConfigError(_)));
    }

    struct MemSource(Vec<u8>);

    impl ReadAt for MemSource {
        fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
            let offset = offset as usize;
            let n = buf.len().min(self.0.len().saturating_sub(offset));
            buf[..n].copy_from_slice(&self.0[offset..offset + n]);
            Ok(n)
        }
    }

    /// Destination that fails every write at or after `fail_from`
    struct FlakyDest {
        data: Mutex<Vec<u8>>,
        fail_from: u64,
        attempts: AtomicUsize,
    }

    impl WriteAt for FlakyDest {
        fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if offset >= self.fail_from {
                return Err(io::Error::new(io::ErrorKind::Other, "injected failure"));
            }
            let offset = offset as usize;
            self.data.lock().unwrap()[offset..offset + buf.len()].copy_from_slice(buf);
            Ok(buf.len())
        }
    }

    #[test]
    fn test_failed_range_surfaces_after_all_ranges_run() {
        let block_size = 4096u64;
        let total_blocks = 64u64;
        let len = (block_size * total_blocks) as usize;
        let source = MemSource(random_bytes(len, 9));
        let dest = FlakyDest {
            data: Mutex::new(vec![0u8; len]),
            fail_from: 32 * block_size,
            attempts: AtomicUsize::new(0),
        };

        let ranges = plan_ranges(total_blocks, 4);
        let copier = RangeCopier::new(&source, Path::new("src"), &dest, Path::new("dst"), block_size);
        let err = copy_ranges(&copier, &ranges, block_size, 4).unwrap_err();

        // the first failing range in order starts at block 32
        assert_eq!(err.offset(), Some(32 * block_size));
        // ranges 0 and 1 wrote 16 blocks each, ranges 2 and 3 tried once each
        assert_eq!(dest.attempts.load(Ordering::SeqCst), 34);
        assert_eq!(&dest.data.lock().unwrap()[..len / 2], &source.0[..len / 2]);
    }

    #[test]
    fn test_copy_ranges_sums_bytes() {
        let len = 10 * 4096 + 10;
        let source = MemSource(random_bytes(len, 13));
        let dest = FlakyDest {
            data: Mutex::new(vec![0u8; len]),
            fail_from: u64::MAX,
            attempts: AtomicUsize::new(0),
        };

        let ranges = plan_ranges(10, 3);
        let copier = RangeCopier::new(&source, Path::new("src"), &dest, Path::new("dst"), 4096);
        assert_eq!(copy_ranges(&copier, &ranges, 4096, 3).unwrap(), 10 * 4096);
        assert_eq!(&dest.data.lock().unwrap()[..10 * 4096], &source.0[..10 * 4096]);
    }

    /// Source that records how many reads are in flight at once
    struct SlowSource {
        inner: MemSource,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ReadAt for SlowSource {
        fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            let result = self.inner.read_at(buf, offset);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    #[test]
    fn test_remainder_range_stays_within_worker_count() {
        let len = 10 * 4096;
        let source = SlowSource {
            inner: MemSource(random_bytes(len, 21)),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let dest = FlakyDest {
            data: Mutex::new(vec![0u8; len]),
            fail_from: u64::MAX,
            attempts: AtomicUsize::new(0),
        };

        // 10 blocks over 3 workers gives 3 + 3 + 3 + 1
        let ranges = plan_ranges(10, 3);
        assert_eq!(ranges.len(), 4);

        let copier = RangeCopier::new(&source, Path::new("src"), &dest, Path::new("dst"), 4096);
        assert_eq!(copy_ranges(&copier, &ranges, 4096, 3).unwrap(), len as u64);

        let peak = source.peak.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak concurrency was {}", peak);
        assert_eq!(source.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(*dest.data.lock().unwrap(), source.inner.0);
    }

    #[test]
    fn test_progress_counts_every_byte() {
        let len = 300_001;
        let source = MemSource(random_bytes(len, 17));
        let dest = FlakyDest {
            data: Mutex::new(vec![0u8; len]),
            fail_from: u64::MAX,
            attempts: AtomicUsize::new(0),
        };
        let progress = ProgressReporter::disabled();

        let copier = RangeCopier::new(&source, Path::new("src"), &dest, Path::new("dst"), 4096)
            .with_progress(Some(&progress));
        assert_eq!(copier.copy_range(0, len as u64).unwrap(), len as u64);
        assert_eq!(progress.bytes_copied(), len as u64);
    }

    #[cfg(unix)]
    #[test]
    fn test_hard_linked_destination_leaves_source_intact() {
        let dir = TempDir::new().unwrap();
        let content = random_bytes(100_000, 23);
        std::fs::write(dir.path().join("src.bin"), &content).unwrap();
        std::fs::hard_link(dir.path().join("src.bin"), dir.path().join("dst.bin")).unwrap();

        let err = ParallelCopier::new(config_for(&dir, 50)).execute().unwrap_err();

        assert!(matches!(err, PcopyError::SameSourceAndDestination(_)));
        assert_eq!(std::fs::read(dir.path().join("src.bin")).unwrap(), content);
    }
}
