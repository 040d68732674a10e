//! File system checks module
//!
//! Validates source and destination paths before a copy starts.

mod validate;

pub use validate::*;
