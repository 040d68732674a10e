//! Progress reporting module
//!
//! Provides real-time byte progress for a copy, with throughput and ETA.

mod reporter;

pub use reporter::*;
