//! Hash computation and integrity verification module
//!
//! Provides post-copy verification using XXHash3 or BLAKE3.

mod integrity;

pub use integrity::*;
