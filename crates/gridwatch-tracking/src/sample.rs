//! Ingest boundary: loosely-typed sample payloads and their validation.
//!
//! Anchor firmware in the field is inconsistent about field names and
//! sends RSSI as either a JSON number or a quoted string. This module
//! absorbs that mess so the pipeline proper only ever sees a validated
//! [`Sample`].

use serde::{Deserialize, Serialize};

use gridwatch_core::{Anchor, DeviceId, Error, Result, Sample, Timestamp};

/// Raw sample payload as delivered by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Reporting device MAC.
    #[serde(alias = "mac_addr", alias = "ssid")]
    pub mac: String,

    /// Wire identifier of the reporting anchor, e.g. `Anchor_2`.
    #[serde(alias = "anchor_id")]
    pub anchor: String,

    /// Signal strength as reported; number or numeric string.
    #[serde(alias = "avg_rssi")]
    pub rssi: serde_json::Value,
}

impl SampleRecord {
    /// Validate the record into a [`Sample`] stamped with `now`.
    ///
    /// Non-numeric RSSI is a caller-side error and is rejected here.
    /// Physically implausible positive RSSI is logged and processed
    /// anyway; the core does not reject it.
    pub fn into_sample(self, now: Timestamp) -> Result<Sample> {
        let anchor = parse_anchor(&self.anchor)?;
        let rssi = parse_rssi(&self.rssi)?;

        if rssi > 0 {
            tracing::warn!(%rssi, mac = %self.mac, "positive RSSI received");
        }

        Ok(Sample {
            device: DeviceId::new(self.mac),
            anchor,
            rssi,
            at: now,
        })
    }
}

/// Map a wire anchor identifier onto its grid axis.
///
/// Accepts the deployed `Anchor_N` naming plus bare indices and axis
/// names, case-insensitively.
pub fn parse_anchor(raw: &str) -> Result<Anchor> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "anchor_1" | "anchor1" | "1" | "left" => Ok(Anchor::Left),
        "anchor_2" | "anchor2" | "2" | "center" => Ok(Anchor::Center),
        "anchor_3" | "anchor3" | "3" | "right" => Ok(Anchor::Right),
        _ => Err(Error::InvalidAnchor(raw.to_string())),
    }
}

fn parse_rssi(value: &serde_json::Value) -> Result<i32> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i as i32)
            } else if let Some(f) = n.as_f64() {
                Ok(f as i32)
            } else {
                Err(Error::InvalidRssi(value.to_string()))
            }
        }
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| Error::InvalidRssi(s.clone())),
        _ => Err(Error::InvalidRssi(value.to_string())),
    }
}
