//! # Gridwatch-Core
//!
//! Core types and utilities for the gridwatch RSSI-based
//! zone tracking system.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
