//! Complete zone tracking pipeline.
//!
//! Ties boundary validation, the device allowlist, the registry, and the
//! rate-limited evaluation/eviction tick into a single streaming entry
//! point: push each sample through [`ZoneTracker::ingest`], call
//! [`ZoneTracker::tick`] on the same path, and consume the returned
//! [`TickReport`]s.

use std::cmp::Ordering;

use tokio::sync::RwLock;

use gridwatch_core::{Anchor, DeviceId, Result, Timestamp, Zone};

use crate::config::TrackerConfig;
use crate::registry::DeviceRegistry;
use crate::sample::SampleRecord;

/// What happened to an ingested record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Validated and delivered to the device's filter.
    Accepted,
    /// Valid, but the device is not in the configured allowlist.
    Ignored,
}

/// One device's result from an evaluation tick.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeviceEvaluation {
    pub device: DeviceId,
    /// Stabilized, externally reported zone.
    pub zone: Zone,
    /// Raw denoised readings (left, center, right) behind the zone.
    pub readings: [Option<f64>; Anchor::COUNT],
}

/// Output of one evaluation/eviction tick, for the persistence and
/// display layers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TickReport {
    pub at: Timestamp,
    /// Evaluations ordered by center-anchor strength, strongest first.
    pub evaluations: Vec<DeviceEvaluation>,
    /// Devices evicted as silent during this tick.
    pub removed: Vec<DeviceId>,
}

type TickObserver = Box<dyn Fn(&TickReport) + Send + Sync>;

/// The assembled tracking pipeline.
pub struct ZoneTracker {
    registry: DeviceRegistry,
    allowlist: Vec<DeviceId>,
    last_tick: RwLock<Option<Timestamp>>,
    observers: Vec<TickObserver>,
}

impl ZoneTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        let allowlist: Vec<DeviceId> = config
            .target_devices
            .iter()
            .map(DeviceId::new)
            .collect();

        tracing::info!(
            allowlisted = allowlist.len(),
            track_all = allowlist.is_empty(),
            "zone tracker started"
        );

        Ok(Self {
            registry: DeviceRegistry::new(config),
            allowlist,
            last_tick: RwLock::new(None),
            observers: Vec::new(),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        self.registry.config()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Register a callback invoked with every emitted tick report.
    pub fn on_tick<F>(&mut self, observer: F)
    where
        F: Fn(&TickReport) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Validate and ingest one raw sample record.
    ///
    /// Returns `Ignored` for devices outside a non-empty allowlist;
    /// invalid records surface the boundary error to the caller.
    pub async fn ingest(&self, record: SampleRecord, now: Timestamp) -> Result<IngestOutcome> {
        let sample = record.into_sample(now)?;

        if !self.allowlist.is_empty() && !self.allowlist.contains(&sample.device) {
            return Ok(IngestOutcome::Ignored);
        }

        self.registry
            .observe(&sample.device, sample.anchor, sample.rssi, sample.at)
            .await;
        Ok(IngestOutcome::Accepted)
    }

    /// Run an evaluation/eviction tick if one is due.
    ///
    /// Evaluation runs at most once per `update_interval_secs` no matter
    /// how fast samples arrive; a call before the interval has elapsed
    /// returns `None` and does no work.
    pub async fn tick(&self, now: Timestamp) -> Option<TickReport> {
        {
            let mut last_tick = self.last_tick.write().await;
            if let Some(last) = *last_tick {
                if now.secs_since(last) <= self.config().update_interval_secs {
                    return None;
                }
            }
            *last_tick = Some(now);
        }

        Some(self.run_tick(now).await)
    }

    /// Run a tick immediately, bypassing the rate gate.
    pub async fn force_tick(&self, now: Timestamp) -> TickReport {
        *self.last_tick.write().await = Some(now);
        self.run_tick(now).await
    }

    async fn run_tick(&self, now: Timestamp) -> TickReport {
        let removed = self.registry.sweep(now).await;

        let mut evaluations = Vec::new();
        for device in self.registry.devices().await {
            let Some(readings) = self.registry.readings(&device, now).await else {
                continue;
            };
            // Nothing meaningful to report while every anchor is silent.
            if readings.iter().all(Option::is_none) {
                continue;
            }
            let Some(zone) = self.registry.evaluate(&device, now).await else {
                continue;
            };
            evaluations.push(DeviceEvaluation {
                device,
                zone,
                readings,
            });
        }

        evaluations.sort_by(|a, b| center_strength(b).partial_cmp(&center_strength(a)).unwrap_or(Ordering::Equal));

        let report = TickReport {
            at: now,
            evaluations,
            removed,
        };

        for observer in &self.observers {
            observer(&report);
        }

        report
    }

    /// Stabilized zone currently displayed for a device.
    pub async fn displayed_zone(&self, device: &DeviceId) -> Option<Zone> {
        self.registry.displayed_zone(device).await
    }
}

fn center_strength(eval: &DeviceEvaluation) -> f64 {
    eval.readings[Anchor::Center.index()].unwrap_or(f64::NEG_INFINITY)
}
