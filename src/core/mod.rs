//! Core copy engine module
//!
//! Positioned I/O primitives, the per-range copier, and the executor that
//! runs ranges on a bounded worker pool.

mod executor;
pub mod io;
mod range;

pub use executor::*;
pub use io::{ReadAt, WriteAt};
pub use range::*;
