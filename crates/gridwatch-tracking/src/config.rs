//! Pipeline tuning parameters.

use gridwatch_core::{Anchor, Error, Result};
use serde::{Deserialize, Serialize};

/// Complete tracker configuration.
///
/// Every field is a deployment tunable; the defaults are the values the
/// system was calibrated with on site. Offsets and thresholds are dBm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Samples weaker than this are dropped before entering the filter.
    pub noise_floor: i32,

    /// Ring-buffer capacity per (device, anchor) for the median filter.
    pub filter_window_size: usize,

    /// Age in seconds beyond which an anchor's last sample, or a whole
    /// device, is considered stale.
    pub max_stale_secs: f64,

    /// Per-axis calibration offsets, added to readings before comparison.
    pub offset_left: f64,
    pub offset_center: f64,
    pub offset_right: f64,

    /// Row boundary thresholds, exclusive lower bounds: a winning reading
    /// strictly above `thresh_front` is Front, strictly above
    /// `thresh_middle` is Middle, anything else is Back.
    pub thresh_front: f64,
    pub thresh_middle: f64,

    /// Voting-window capacity for the zone debouncer.
    pub stabilization_count: usize,

    /// Minimum seconds between evaluation/eviction ticks.
    pub update_interval_secs: f64,

    /// MAC addresses to track. Empty means every reporting device.
    pub target_devices: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            noise_floor: -95,
            filter_window_size: 15,
            max_stale_secs: 4.0,
            offset_left: 0.0,
            offset_center: 0.0,
            offset_right: 0.0,
            thresh_front: -60.0,
            thresh_middle: -70.0,
            stabilization_count: 8,
            update_interval_secs: 0.2,
            target_devices: Vec::new(),
        }
    }
}

impl TrackerConfig {
    /// Calibration offset for one anchor axis.
    pub fn offset(&self, anchor: Anchor) -> f64 {
        match anchor {
            Anchor::Left => self.offset_left,
            Anchor::Center => self.offset_center,
            Anchor::Right => self.offset_right,
        }
    }

    /// Check internal consistency of the tunables.
    pub fn validate(&self) -> Result<()> {
        if self.filter_window_size == 0 {
            return Err(Error::Config("filter_window_size must be at least 1".into()));
        }
        if self.stabilization_count == 0 {
            return Err(Error::Config("stabilization_count must be at least 1".into()));
        }
        if self.thresh_front <= self.thresh_middle {
            return Err(Error::Config(format!(
                "thresh_front ({}) must be greater than thresh_middle ({})",
                self.thresh_front, self.thresh_middle
            )));
        }
        if self.max_stale_secs <= 0.0 {
            return Err(Error::Config("max_stale_secs must be positive".into()));
        }
        if self.update_interval_secs < 0.0 {
            return Err(Error::Config("update_interval_secs must not be negative".into()));
        }
        Ok(())
    }

    /// Load configuration from a file, with `GRIDWATCH_*` environment
    /// variables layered on top.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("GRIDWATCH"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from environment variables only.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("GRIDWATCH"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }
}
