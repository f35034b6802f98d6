//! Per-device state ownership and lifecycle.

use std::collections::HashMap;

use tokio::sync::RwLock;

use gridwatch_core::{Anchor, DeviceId, Timestamp, Zone};

use crate::classifier::classify;
use crate::config::TrackerConfig;
use crate::filter::SignalFilter;
use crate::stabilizer::ZoneStabilizer;

/// Filter set plus debouncer for one tracked device.
#[derive(Debug)]
struct DeviceState {
    filter: SignalFilter,
    stabilizer: ZoneStabilizer,
}

impl DeviceState {
    fn new(config: &TrackerConfig) -> Self {
        Self {
            filter: SignalFilter::new(
                config.filter_window_size,
                config.noise_floor,
                config.max_stale_secs,
            ),
            stabilizer: ZoneStabilizer::new(config.stabilization_count),
        }
    }
}

/// Registry of tracked devices.
///
/// Owns one [`SignalFilter`] set and one [`ZoneStabilizer`] per device,
/// creating them lazily on first sample and evicting devices that have
/// gone silent. All state sits behind one `RwLock`, so a sample update is
/// atomic with respect to evaluation reads and first-sample creation
/// cannot produce duplicate entries.
pub struct DeviceRegistry {
    config: TrackerConfig,
    devices: RwLock<HashMap<DeviceId, DeviceState>>,
}

impl DeviceRegistry {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            devices: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Feed one validated sample into the owning device's filter,
    /// creating the device state on first sighting.
    pub async fn observe(&self, device: &DeviceId, anchor: Anchor, rssi: i32, now: Timestamp) {
        let mut devices = self.devices.write().await;
        let state = devices
            .entry(device.clone())
            .or_insert_with(|| DeviceState::new(&self.config));
        state.filter.update(anchor, rssi, now);
    }

    /// Run one evaluation tick for a device: read all three anchors,
    /// classify, and push through the stabilizer.
    ///
    /// Returns `None` for a device the registry has never seen; evaluation
    /// never creates state.
    pub async fn evaluate(&self, device: &DeviceId, now: Timestamp) -> Option<Zone> {
        let mut devices = self.devices.write().await;
        let state = devices.get_mut(device)?;

        let [left, center, right] = state.filter.readings(now);
        let zone = classify(left, center, right, &self.config);
        Some(state.stabilizer.push(zone))
    }

    /// Raw denoised per-anchor readings for a device, for display or
    /// storage by the presentation layer.
    pub async fn readings(
        &self,
        device: &DeviceId,
        now: Timestamp,
    ) -> Option<[Option<f64>; Anchor::COUNT]> {
        let devices = self.devices.read().await;
        Some(devices.get(device)?.filter.readings(now))
    }

    /// Zone currently displayed for a device, without recording a vote.
    pub async fn displayed_zone(&self, device: &DeviceId) -> Option<Zone> {
        let devices = self.devices.read().await;
        Some(devices.get(device)?.stabilizer.displayed())
    }

    /// Remove every device whose most recent valid sample is older than
    /// the staleness bound, returning the removed identifiers.
    ///
    /// Devices that never recorded a valid sample (every reading fell
    /// below the noise floor) count as stale immediately. Full-table
    /// scan; the tracked population is a handful of co-located devices.
    pub async fn sweep(&self, now: Timestamp) -> Vec<DeviceId> {
        let mut devices = self.devices.write().await;
        let mut removed = Vec::new();

        devices.retain(|device, state| {
            let stale = match state.filter.last_seen_overall() {
                Some(last_seen) => now.secs_since(last_seen) > self.config.max_stale_secs,
                None => true,
            };
            if stale {
                tracing::debug!(device = %device, "evicting silent device");
                removed.push(device.clone());
            }
            !stale
        });

        removed
    }

    /// Identifiers of all currently tracked devices.
    pub async fn devices(&self) -> Vec<DeviceId> {
        let devices = self.devices.read().await;
        devices.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.devices.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: f64) -> Timestamp {
        Timestamp::from_secs_f64(secs)
    }

    fn device() -> DeviceId {
        DeviceId::new("aa:bb:cc:dd:ee:ff")
    }

    #[tokio::test]
    async fn test_first_sample_creates_device() {
        let registry = DeviceRegistry::new(TrackerConfig::default());
        assert!(registry.is_empty().await);

        registry.observe(&device(), Anchor::Left, -50, at(0.0)).await;
        assert_eq!(registry.devices().await, vec![device()]);
    }

    #[tokio::test]
    async fn test_evaluate_unknown_device_is_none() {
        let registry = DeviceRegistry::new(TrackerConfig::default());
        assert_eq!(registry.evaluate(&device(), at(0.0)).await, None);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_evaluate_classifies_and_stabilizes() {
        let registry = DeviceRegistry::new(TrackerConfig::default());
        let dev = device();

        registry.observe(&dev, Anchor::Left, -40, at(0.0)).await;
        registry.observe(&dev, Anchor::Center, -90, at(0.0)).await;
        registry.observe(&dev, Anchor::Right, -90, at(0.0)).await;

        // Bootstrap: the first classification shows through immediately.
        let zone = registry.evaluate(&dev, at(0.1)).await.unwrap();
        assert_eq!(zone.index(), Some(1));
    }

    #[tokio::test]
    async fn test_reevaluation_without_new_samples_is_idempotent() {
        let registry = DeviceRegistry::new(TrackerConfig::default());
        let dev = device();

        registry.observe(&dev, Anchor::Center, -65, at(0.0)).await;

        let first = registry.evaluate(&dev, at(0.1)).await.unwrap();
        for i in 0..10 {
            let again = registry.evaluate(&dev, at(0.1 + i as f64 * 0.01)).await;
            assert_eq!(again, Some(first));
        }
    }

    #[tokio::test]
    async fn test_readings_expose_denoised_values() {
        let registry = DeviceRegistry::new(TrackerConfig::default());
        let dev = device();

        registry.observe(&dev, Anchor::Left, -60, at(0.0)).await;
        registry.observe(&dev, Anchor::Left, -62, at(0.1)).await;

        let readings = registry.readings(&dev, at(0.2)).await.unwrap();
        assert_eq!(readings, [Some(-61.0), None, None]);
        assert_eq!(registry.readings(&DeviceId::new("nope"), at(0.2)).await, None);
    }

    #[tokio::test]
    async fn test_sweep_removes_silent_devices() {
        let registry = DeviceRegistry::new(TrackerConfig::default());
        let quiet = DeviceId::new("11:11:11:11:11:11");
        let active = DeviceId::new("22:22:22:22:22:22");

        registry.observe(&quiet, Anchor::Left, -50, at(0.0)).await;
        registry.observe(&active, Anchor::Left, -50, at(4.5)).await;

        let removed = registry.sweep(at(5.0)).await;
        assert_eq!(removed, vec![quiet]);
        assert_eq!(registry.devices().await, vec![active]);
    }

    #[tokio::test]
    async fn test_sweep_removes_devices_with_no_valid_samples() {
        let registry = DeviceRegistry::new(TrackerConfig::default());
        let dev = device();

        // Every sample below the noise floor: state exists, window empty.
        registry.observe(&dev, Anchor::Left, -120, at(0.0)).await;
        assert_eq!(registry.len().await, 1);

        let removed = registry.sweep(at(0.1)).await;
        assert_eq!(removed, vec![dev]);
    }
}
