//! Zone classification from denoised anchor readings.

use gridwatch_core::{Anchor, Row, Zone};

use crate::config::TrackerConfig;

/// Classify three simultaneous denoised readings into a grid zone.
///
/// Pure and total: any combination of readings, including all three
/// absent, produces a zone. The column is the axis of the strongest
/// calibrated reading; the row comes from comparing that reading against
/// the two exclusive thresholds.
///
/// Calibration offsets are applied before comparison, so an axis with a
/// favorable offset can out-rank a raw-stronger neighbor. Absent readings
/// pass through unmodified and can never win. Exact ties go to the
/// earliest axis in evaluation order (Left, Center, Right) - a real
/// occurrence whenever offsets are zeroed, not a theoretical edge case.
pub fn classify(
    left: Option<f64>,
    center: Option<f64>,
    right: Option<f64>,
    config: &TrackerConfig,
) -> Zone {
    let mut best: Option<(Anchor, f64)> = None;

    for anchor in Anchor::ALL {
        let raw = match anchor {
            Anchor::Left => left,
            Anchor::Center => center,
            Anchor::Right => right,
        };
        let Some(value) = raw else { continue };
        let adjusted = value + config.offset(anchor);

        match best {
            Some((_, strongest)) if adjusted <= strongest => {}
            _ => best = Some((anchor, adjusted)),
        }
    }

    let Some((axis, strongest)) = best else {
        return Zone::Unknown;
    };

    let row = if strongest > config.thresh_front {
        Row::Front
    } else if strongest > config.thresh_middle {
        Row::Middle
    } else {
        Row::Back
    };

    Zone::block(row, axis.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwatch_core::Column;

    fn config() -> TrackerConfig {
        TrackerConfig::default()
    }

    #[test]
    fn test_strong_left_is_block_1() {
        let zone = classify(Some(-40.0), Some(-90.0), Some(-90.0), &config());
        assert_eq!(zone, Zone::block(Row::Front, Column::Left));
        assert_eq!(zone.index(), Some(1));
    }

    #[test]
    fn test_medium_center_is_block_5() {
        // -65 sits between thresh_front (-60) and thresh_middle (-70).
        let zone = classify(Some(-90.0), Some(-65.0), Some(-90.0), &config());
        assert_eq!(zone.index(), Some(5));
    }

    #[test]
    fn test_weak_right_is_block_9() {
        let zone = classify(Some(-90.0), Some(-90.0), Some(-80.0), &config());
        assert_eq!(zone.index(), Some(9));
    }

    #[test]
    fn test_offsets_apply_before_comparison() {
        let config = TrackerConfig {
            offset_center: 3.0,
            ..TrackerConfig::default()
        };
        // Raw left -60 beats raw center -61, but calibrated center is -58.
        let zone = classify(Some(-60.0), Some(-61.0), Some(-90.0), &config);
        assert_eq!(zone, Zone::block(Row::Front, Column::Center));
    }

    #[test]
    fn test_all_absent_is_unknown() {
        assert_eq!(classify(None, None, None, &config()), Zone::Unknown);
    }

    #[test]
    fn test_exact_tie_goes_to_earliest_axis() {
        let zone = classify(Some(-50.0), Some(-50.0), Some(-50.0), &config());
        assert_eq!(zone, Zone::block(Row::Front, Column::Left));

        let zone = classify(None, Some(-65.0), Some(-65.0), &config());
        assert_eq!(zone, Zone::block(Row::Middle, Column::Center));
    }

    #[test]
    fn test_threshold_boundaries_fall_to_weaker_row() {
        // Thresholds are exclusive lower bounds: equal means the farther row.
        let zone = classify(Some(-60.0), None, None, &config());
        assert_eq!(zone, Zone::block(Row::Middle, Column::Left));

        let zone = classify(Some(-70.0), None, None, &config());
        assert_eq!(zone, Zone::block(Row::Back, Column::Left));
    }

    #[test]
    fn test_single_live_anchor_wins() {
        let zone = classify(None, None, Some(-55.0), &config());
        assert_eq!(zone, Zone::block(Row::Front, Column::Right));
    }
}
