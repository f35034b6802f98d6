//! # Gridwatch-Tracking
//!
//! The gridwatch signal-processing pipeline: converts streams of raw RSSI
//! samples from three fixed anchors into a stable per-device grid zone.
//!
//! ## Stages
//!
//! 1. [`SignalFilter`] - per-anchor median filtering over a bounded window,
//!    with noise-floor rejection and staleness tracking
//! 2. [`classify`] - deterministic mapping of three denoised readings to a
//!    discrete [`Zone`](gridwatch_core::Zone)
//! 3. [`ZoneStabilizer`] - majority-vote debouncing of the classifier output
//! 4. [`DeviceRegistry`] - per-device state ownership and staleness eviction
//!
//! [`ZoneTracker`] ties the stages together behind the ingest boundary and
//! the rate-limited evaluation tick.

pub mod classifier;
pub mod config;
pub mod filter;
pub mod pipeline;
pub mod registry;
pub mod sample;
pub mod stabilizer;

pub use classifier::classify;
pub use config::TrackerConfig;
pub use filter::SignalFilter;
pub use pipeline::{DeviceEvaluation, IngestOutcome, TickReport, ZoneTracker};
pub use registry::DeviceRegistry;
pub use sample::SampleRecord;
pub use stabilizer::ZoneStabilizer;
