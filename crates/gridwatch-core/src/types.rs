//! Fundamental types for the gridwatch system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a tracked device (a normalized MAC address).
///
/// Upstream reporters disagree on casing and padding, so the constructor
/// canonicalizes to trimmed lowercase; two ids compare equal iff they
/// refer to the same radio.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the three fixed anchor points, named by the grid axis it covers.
///
/// The declaration order is the evaluation order: when adjusted readings
/// tie, the earliest anchor in this order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Anchor {
    Left = 0,
    Center = 1,
    Right = 2,
}

impl Anchor {
    pub const COUNT: usize = 3;

    /// All anchors in evaluation order.
    pub const ALL: [Anchor; Anchor::COUNT] = [Anchor::Left, Anchor::Center, Anchor::Right];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::Left),
            1 => Some(Self::Center),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1_000_000_000.0).round() as i64)
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is ahead).
    pub fn secs_since(&self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0) as f64 / 1_000_000_000.0
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

/// Grid row, ordered front (nearest the anchor line) to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Row {
    Front = 0,
    Middle = 1,
    Back = 2,
}

impl Row {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Grid column; always the axis of the winning anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Column {
    Left = 0,
    Center = 1,
    Right = 2,
}

impl Column {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl From<Anchor> for Column {
    fn from(anchor: Anchor) -> Self {
        match anchor {
            Anchor::Left => Column::Left,
            Anchor::Center => Column::Center,
            Anchor::Right => Column::Right,
        }
    }
}

/// Resolved occupancy zone: one of the nine grid blocks, or `Unknown` when
/// no anchor holds recent valid data.
///
/// This is the internal representation; "Block 5" style text exists only in
/// the `Display` impl for consumers at the reporting boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Unknown,
    Block { row: Row, col: Column },
}

impl Zone {
    pub fn block(row: Row, col: Column) -> Self {
        Zone::Block { row, col }
    }

    /// Row-major block number 1-9, or `None` for `Unknown`.
    pub fn index(&self) -> Option<u8> {
        match self {
            Zone::Unknown => None,
            Zone::Block { row, col } => Some((row.index() * 3 + col.index() + 1) as u8),
        }
    }

    pub fn from_index(idx: u8) -> Option<Self> {
        if !(1..=9).contains(&idx) {
            return None;
        }
        let i = (idx - 1) as usize;
        let row = match i / 3 {
            0 => Row::Front,
            1 => Row::Middle,
            _ => Row::Back,
        };
        let col = match i % 3 {
            0 => Column::Left,
            1 => Column::Center,
            _ => Column::Right,
        };
        Some(Zone::Block { row, col })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Zone::Unknown)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(n) => write!(f, "Block {}", n),
            None => f.write_str("Unknown"),
        }
    }
}

/// A single validated RSSI observation. Transient: consumed by the filter
/// at ingestion and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub device: DeviceId,
    pub anchor: Anchor,
    /// Received signal strength (dBm); negative in normal operation.
    pub rssi: i32,
    pub at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_normalization() {
        let a = DeviceId::new(" 28:C2:1F:EC:23:1A ");
        let b = DeviceId::new("28:c2:1f:ec:23:1a");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "28:c2:1f:ec:23:1a");
    }

    #[test]
    fn test_block_index_row_major() {
        assert_eq!(Zone::block(Row::Front, Column::Left).index(), Some(1));
        assert_eq!(Zone::block(Row::Front, Column::Right).index(), Some(3));
        assert_eq!(Zone::block(Row::Middle, Column::Center).index(), Some(5));
        assert_eq!(Zone::block(Row::Back, Column::Right).index(), Some(9));
        assert_eq!(Zone::Unknown.index(), None);
    }

    #[test]
    fn test_block_index_roundtrip() {
        for idx in 1..=9u8 {
            let zone = Zone::from_index(idx).unwrap();
            assert_eq!(zone.index(), Some(idx));
        }
        assert_eq!(Zone::from_index(0), None);
        assert_eq!(Zone::from_index(10), None);
    }

    #[test]
    fn test_zone_display() {
        assert_eq!(Zone::block(Row::Middle, Column::Center).to_string(), "Block 5");
        assert_eq!(Zone::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_timestamp_secs_since() {
        let t0 = Timestamp::from_secs_f64(10.0);
        let t1 = Timestamp::from_secs_f64(14.5);
        assert!((t1.secs_since(t0) - 4.5).abs() < 1e-9);
        assert!((t0.secs_since(t1) + 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_anchor_order_is_evaluation_order() {
        assert_eq!(Anchor::ALL[0], Anchor::Left);
        assert_eq!(Anchor::ALL[1], Anchor::Center);
        assert_eq!(Anchor::ALL[2], Anchor::Right);
        for (i, anchor) in Anchor::ALL.iter().enumerate() {
            assert_eq!(anchor.index(), i);
            assert_eq!(Anchor::from_index(i), Some(*anchor));
        }
    }
}
