//! Turning-point detection over raw gauge readings.
//!
//! The gauge network reports water levels but no forecast, so high/low
//! events have to be recovered from the reading series itself. A reading is
//! a turning point when it stands above (or below) the mean of the readings
//! on both sides of it by more than a prominence threshold; nearby
//! candidates from the same physical event are then collapsed to one.
//!
//! This is strictly retrospective — it finds turning points that already
//! happened. Forward-looking predictions come from the forecast providers,
//! which is why the resolver enriches gauge results whenever it can.

use chrono::Duration;
use serde::Deserialize;

use crate::model::{TideKind, TidePrediction, TideReading};

/// Detection tuning. The defaults are sized for UK tidal ranges sampled at
/// the gauge network's 15-minute cadence; micro-tidal deployments (range
/// under ~0.6 m) should lower `prominence_m` or they may detect nothing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtremaConfig {
    /// Readings averaged on each side of a candidate. Eight readings is
    /// about two hours of 15-minute data — wide enough that a genuine
    /// tidal crest clears the prominence bar, narrow enough to keep the
    /// detected time close to the true extremum.
    pub window: usize,
    /// Minimum height delta over both side means for a candidate to count
    /// as a real turning point rather than sensor noise.
    pub prominence_m: f64,
    /// Candidates within this span of an accepted turning point are
    /// duplicate detections of the same event and are dropped.
    pub dedup_window_hours: i64,
    /// Below this many readings the series cannot support detection and
    /// the result is an empty set (not an error).
    pub min_readings: usize,
}

impl Default for ExtremaConfig {
    fn default() -> Self {
        Self {
            window: 8,
            prominence_m: 0.3,
            dedup_window_hours: 2,
            min_readings: 5,
        }
    }
}

/// Derives high/low turning points from an ascending-time reading series.
///
/// Returns an empty vector for series shorter than `min_readings`; the
/// output is ascending in time and de-duplicated per the config.
pub fn detect_turning_points(
    readings: &[TideReading],
    config: &ExtremaConfig,
) -> Vec<TidePrediction> {
    if readings.len() < config.min_readings {
        return Vec::new();
    }

    let w = config.window;
    if readings.len() < 2 * w + 1 {
        return Vec::new();
    }

    let mut candidates = Vec::new();

    for i in w..readings.len() - w {
        let level = readings[i].level_m;
        let before = mean_level(&readings[i - w..i]);
        let after = mean_level(&readings[i + 1..i + 1 + w]);

        let kind = if level - before > config.prominence_m && level - after > config.prominence_m
        {
            Some(TideKind::High)
        } else if before - level > config.prominence_m && after - level > config.prominence_m {
            Some(TideKind::Low)
        } else {
            None
        };

        if let Some(kind) = kind {
            candidates.push(TidePrediction {
                time: readings[i].time,
                height_m: level,
                kind,
            });
        }
    }

    dedup_candidates(candidates, Duration::hours(config.dedup_window_hours))
}

fn mean_level(readings: &[TideReading]) -> f64 {
    readings.iter().map(|r| r.level_m).sum::<f64>() / readings.len() as f64
}

/// Scanning chronologically, keeps a candidate only when it is more than
/// `window` away from the last accepted one. A single physical turning
/// point often produces a cluster of adjacent candidates; the first one is
/// the event.
fn dedup_candidates(candidates: Vec<TidePrediction>, window: Duration) -> Vec<TidePrediction> {
    let mut accepted: Vec<TidePrediction> = Vec::new();

    for candidate in candidates {
        match accepted.last() {
            Some(last) if candidate.time - last.time <= window => continue,
            _ => accepted.push(candidate),
        }
    }

    accepted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
