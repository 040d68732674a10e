//! Progress reporter implementation
//!
//! Uses indicatif for a byte progress bar with throughput and ETA. Workers
//! update it concurrently; all counters are atomics.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress reporter for a single-file copy
pub struct ProgressReporter {
    /// Byte progress bar
    bytes_bar: ProgressBar,
    /// Start time
    start_time: Instant,
    /// Bytes copied so far
    bytes_copied: AtomicU64,
}

impl ProgressReporter {
    /// Create a new progress reporter drawing to stderr
    pub fn new() -> Self {
        let bytes_bar = ProgressBar::new(0);
        bytes_bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold.dim} [{bar:40.green/white}] {bytes}/{total_bytes} ({bytes_per_sec}, ETA {eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bytes_bar.set_prefix("Data");

        Self {
            bytes_bar,
            start_time: Instant::now(),
            bytes_copied: AtomicU64::new(0),
        }
    }

    /// Create a disabled progress reporter (for quiet mode)
    pub fn disabled() -> Self {
        let reporter = Self::new();
        reporter.bytes_bar.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    /// Set total bytes to transfer
    pub fn set_total_bytes(&self, total: u64) {
        self.bytes_bar.set_length(total);
    }

    /// Increment bytes copied
    pub fn increment_bytes(&self, bytes: u64) {
        self.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
        self.bytes_bar.inc(bytes);
    }

    /// Set current status message
    pub fn set_status(&self, msg: &str) {
        self.bytes_bar.set_message(msg.to_string());
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get current throughput in bytes/second
    pub fn throughput(&self) -> f64 {
        let bytes = self.bytes_copied.load(Ordering::Relaxed);
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            bytes as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Bytes reported so far
    pub fn bytes_copied(&self) -> u64 {
        self.bytes_copied.load(Ordering::Relaxed)
    }

    /// Finish progress with success message and the average rate
    pub fn finish_success(&self, message: &str) {
        self.bytes_bar.finish_with_message(format!(
            "✓ {} ({}/s in {:.2?})",
            message,
            humansize::format_size(self.throughput() as u64, humansize::BINARY),
            self.elapsed()
        ));
    }

    /// Finish progress with error message
    pub fn finish_error(&self, message: &str) {
        self.bytes_bar.abandon_with_message(format!("✗ {}", message));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reporter() {
        let reporter = ProgressReporter::disabled();

        reporter.set_total_bytes(1000);
        reporter.increment_bytes(250);
        reporter.increment_bytes(250);

        assert_eq!(reporter.bytes_copied(), 500);
        assert!(reporter.throughput() > 0.0);
        reporter.finish_success("done");
    }

    #[test]
    fn test_concurrent_increments() {
        let reporter = ProgressReporter::disabled();
        reporter.set_total_bytes(8 * 4096);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| reporter.increment_bytes(4096));
            }
        });

        assert_eq!(reporter.bytes_copied(), 8 * 4096);
    }
}
