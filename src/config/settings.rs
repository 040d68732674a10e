//! Configuration settings for pcopy
//!
//! Defines the CLI arguments, the runtime configuration derived from them,
//! and defaults for the copy operation.

use crate::plan::{WorkerBudget, DEFAULT_MAX_WORKERS, DEFAULT_MIN_WORKERS};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// pcopy - copy one large file with parallel range workers
#[derive(Parser, Debug, Clone)]
#[command(name = "pcopy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A threaded cp for a single large file")]
#[command(long_about = r#"
pcopy splits a single file into contiguous byte ranges and copies each range
on its own worker, using positioned reads and writes against the source and
destination.

A failed copy may leave a partially written destination file behind.

Examples:
  pcopy big.img /mnt/fast/big.img            # Copy with up to 50 workers
  pcopy big.img copy.img -w 16 --verify      # 16 workers, verify with XXHash3
  pcopy big.img copy.img --dry-run -v        # Show the plan only
"#)]
pub struct CliArgs {
    /// File to copy
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Destination file (created or truncated)
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Maximum number of concurrent workers
    #[arg(short = 'w', long, default_value_t = DEFAULT_MAX_WORKERS, value_name = "NUM")]
    pub max_workers: usize,

    /// Minimum number of concurrent workers
    #[arg(long, default_value_t = DEFAULT_MIN_WORKERS, value_name = "NUM")]
    pub min_workers: usize,

    /// Verify the copy by hashing both files afterwards
    #[arg(long, value_enum, value_name = "ALGO", num_args = 0..=1, default_missing_value = "xxhash3")]
    pub verify: Option<HashAlgorithm>,

    /// Show a progress bar
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress the summary)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Print the copy plan without copying
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Flush the destination to disk before exiting
    #[arg(long)]
    pub fsync: bool,

    /// Output format for the summary
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

/// Hash algorithm for integrity verification
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// XXHash3 - Ultra fast, non-cryptographic (128-bit)
    #[default]
    #[value(name = "xxhash3")]
    XXHash3,
    /// BLAKE3 - Fast and cryptographically secure
    #[value(name = "blake3")]
    Blake3,
}

impl HashAlgorithm {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::XXHash3 => "XXHash3",
            Self::Blake3 => "BLAKE3",
        }
    }
}

/// Output format for the summary
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Source file
    pub source: PathBuf,
    /// Destination file
    pub destination: PathBuf,
    /// Worker floor
    pub min_workers: usize,
    /// Worker ceiling
    pub max_workers: usize,
    /// Hash algorithm for verification
    pub verify: Option<HashAlgorithm>,
    /// Sync the destination before returning
    pub fsync: bool,
    /// Plan only, do not copy
    pub dry_run: bool,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            min_workers: DEFAULT_MIN_WORKERS,
            max_workers: DEFAULT_MAX_WORKERS,
            verify: None,
            fsync: false,
            dry_run: false,
        }
    }
}

impl CopyConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        let config = Self {
            source: args.source.clone(),
            destination: args.destination.clone(),
            min_workers: args.min_workers,
            max_workers: args.max_workers,
            verify: args.verify,
            fsync: args.fsync,
            dry_run: args.dry_run,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject worker budgets the planner cannot use
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max workers must be at least 1".to_string());
        }
        if self.min_workers == 0 {
            return Err("min workers must be at least 1".to_string());
        }
        if self.min_workers > self.max_workers {
            return Err(format!(
                "min workers ({}) exceeds max workers ({})",
                self.min_workers, self.max_workers
            ));
        }
        Ok(())
    }

    /// Worker budget for planning
    pub fn worker_budget(&self) -> WorkerBudget {
        WorkerBudget::new(self.min_workers, self.max_workers)
    }
}
