//! Per-anchor RSSI noise suppression.
//!
//! Each anchor slot keeps a bounded window of recent valid samples and
//! reports the statistical median of that window. The median is the
//! deliberate choice over the mean: a single multipath spike cannot win a
//! ranking-based middle value unless it fills more than half the window,
//! so no separate outlier-detection stage is needed.

use std::collections::VecDeque;

use gridwatch_core::{Anchor, Timestamp};

/// State for one anchor slot.
#[derive(Debug, Clone)]
struct AnchorWindow {
    samples: VecDeque<i32>,
    last_seen: Timestamp,
}

/// Rolling noise filter for one device across all three anchors.
///
/// Tracks a fixed-capacity sample window and a last-seen time per anchor.
/// Readings are exposed through [`SignalFilter::value`], which yields
/// `None` (the staleness sentinel) for anchors with no recent valid data.
#[derive(Debug, Clone)]
pub struct SignalFilter {
    window_size: usize,
    noise_floor: i32,
    max_stale_secs: f64,
    anchors: [Option<AnchorWindow>; Anchor::COUNT],
}

impl SignalFilter {
    pub fn new(window_size: usize, noise_floor: i32, max_stale_secs: f64) -> Self {
        Self {
            window_size: window_size.max(1),
            noise_floor,
            max_stale_secs,
            anchors: [None, None, None],
        }
    }

    /// Ingest one raw sample for an anchor.
    ///
    /// Samples below the noise floor are discarded without any state
    /// change; they never enter the window and never advance last-seen.
    pub fn update(&mut self, anchor: Anchor, rssi: i32, now: Timestamp) {
        if rssi < self.noise_floor {
            tracing::debug!(%rssi, ?anchor, "dropping sample below noise floor");
            return;
        }

        let window_size = self.window_size;
        let slot = self.anchors[anchor.index()].get_or_insert_with(|| AnchorWindow {
            samples: VecDeque::with_capacity(window_size),
            last_seen: now,
        });

        slot.samples.push_back(rssi);
        if slot.samples.len() > self.window_size {
            slot.samples.pop_front();
        }
        slot.last_seen = now;
    }

    /// Denoised reading for an anchor at time `now`.
    ///
    /// Returns `None` when the anchor has never recorded a valid sample or
    /// its most recent valid sample is older than the staleness bound,
    /// regardless of how full the window still is. Otherwise returns the
    /// median of the window contents.
    pub fn value(&self, anchor: Anchor, now: Timestamp) -> Option<f64> {
        let slot = self.anchors[anchor.index()].as_ref()?;
        if slot.samples.is_empty() {
            return None;
        }
        if now.secs_since(slot.last_seen) > self.max_stale_secs {
            return None;
        }
        Some(median(&slot.samples))
    }

    /// All three anchor readings in evaluation order.
    pub fn readings(&self, now: Timestamp) -> [Option<f64>; Anchor::COUNT] {
        [
            self.value(Anchor::Left, now),
            self.value(Anchor::Center, now),
            self.value(Anchor::Right, now),
        ]
    }

    /// Latest last-seen time across all anchors, used for whole-device
    /// eviction. `None` if no valid sample was ever recorded.
    pub fn last_seen_overall(&self) -> Option<Timestamp> {
        self.anchors
            .iter()
            .flatten()
            .map(|slot| slot.last_seen)
            .max()
    }
}

/// Conventional statistical median: the middle order statistic, or the
/// mean of the two middle order statistics for an even count.
fn median(samples: &VecDeque<i32>) -> f64 {
    let mut sorted: Vec<i32> = samples.iter().copied().collect();
    sorted.sort_unstable();

    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}
