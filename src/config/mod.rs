//! Configuration module for pcopy
//!
//! Provides CLI arguments and runtime settings.

mod settings;

pub use settings::*;
