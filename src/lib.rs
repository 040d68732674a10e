//! # pcopy - Parallel Single-File Copy
//!
//! pcopy copies one large file by splitting it into contiguous byte ranges
//! and copying each range on its own worker thread. All workers share the
//! same source and destination handles through positioned reads and writes,
//! so no worker ever depends on a shared seek cursor.
//!
//! ## How a copy is planned
//!
//! 1. A power-of-two block size between 4 KiB and 1 MiB is derived from the
//!    file size and the worker ceiling (files under 4 KiB are one block).
//! 2. The worker count is halved from the ceiling until each worker has at
//!    least 100 blocks, never dropping below the floor.
//! 3. The block-aligned prefix is tiled into contiguous ranges.
//! 4. Ranges run concurrently; the unaligned tail is copied afterwards.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pcopy::core::parallel_copy;
//! use std::path::Path;
//!
//! let report = parallel_copy(Path::new("/data/big.img"), Path::new("/scratch/big.img")).unwrap();
//! println!("Copied {} bytes with {} workers", report.bytes_copied, report.plan.worker_count());
//! ```
//!
//! ## Planning Only
//!
//! ```
//! use pcopy::plan::{CopyPlan, WorkerBudget};
//!
//! let plan = CopyPlan::for_size(1_000_000, WorkerBudget::default());
//! assert_eq!(plan.block_size(), 16384);
//! assert_eq!(plan.tail_len(), 576);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod hash;
pub mod plan;
pub mod progress;

// Re-export commonly used types
pub use config::{CopyConfig, HashAlgorithm};
pub use core::{CopyReport, ParallelCopier};
pub use error::{PcopyError, Result};
pub use plan::{CopyPlan, CopyRange, WorkerBudget};
pub use progress::ProgressReporter;
