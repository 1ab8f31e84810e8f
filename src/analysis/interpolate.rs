//! Current-state estimation between known tide extrema.
//!
//! Tidal height between a high and a low follows an S-curve: slow near the
//! turning points, fastest at mid-tide. A linear ramp between extrema
//! overstates the rate near the turn and understates it mid-tide, so the
//! blend between the bracketing pair uses raised-cosine shaping instead.

use chrono::{DateTime, Utc};
use std::f64::consts::PI;

use crate::model::{CurrentTide, TideExtremes, TideKind, TidePrediction, TideTrend};

/// Estimates the tide state at `now` from a time-ascending prediction
/// series.
///
/// Finds the bracketing pair `prev.time <= now < next.time` and blends
/// their heights with raised-cosine shaping. The height is always a convex
/// combination of the two bracketing extrema — never extrapolated.
///
/// Returns `None` when `now` falls outside the known predictions on either
/// side: with no bracketing pair there is no honest height estimate.
pub fn estimate_current(
    predictions: &[TidePrediction],
    now: DateTime<Utc>,
) -> Option<CurrentTide> {
    let next_idx = predictions.iter().position(|p| p.time > now)?;
    if next_idx == 0 {
        // `now` precedes everything known; no honest estimate exists.
        return None;
    }

    let prev = &predictions[next_idx - 1];
    let next = &predictions[next_idx];

    let span_secs = (next.time - prev.time).num_seconds();
    if span_secs <= 0 {
        return None;
    }

    let progress =
        ((now - prev.time).num_seconds() as f64 / span_secs as f64).clamp(0.0, 1.0);
    let shaped = (1.0 - (progress * PI).cos()) / 2.0;
    let height_m = prev.height_m + (next.height_m - prev.height_m) * shaped;

    let trend = match next.kind {
        TideKind::High => TideTrend::Rising,
        TideKind::Low => TideTrend::Falling,
    };

    Some(CurrentTide {
        height_m,
        trend,
        next_tide: Some(next.clone()),
    })
}

/// The first high and first low strictly after `now`. `None` when neither
/// exists in the series.
pub fn upcoming_extremes(
    predictions: &[TidePrediction],
    now: DateTime<Utc>,
) -> Option<TideExtremes> {
    let next_high = predictions
        .iter()
        .find(|p| p.time > now && p.kind == TideKind::High)
        .cloned();
    let next_low = predictions
        .iter()
        .find(|p| p.time > now && p.kind == TideKind::Low)
        .cloned();

    if next_high.is_none() && next_low.is_none() {
        None
    } else {
        Some(TideExtremes { next_high, next_low })
    }
}

/// The first prediction of each kind in a date-range window, regardless of
/// the current time. Used by forward-dated queries where "now" is
/// meaningless.
pub fn window_extremes(predictions: &[TidePrediction]) -> Option<TideExtremes> {
    let next_high = predictions.iter().find(|p| p.kind == TideKind::High).cloned();
    let next_low = predictions.iter().find(|p| p.kind == TideKind::Low).cloned();

    if next_high.is_none() && next_low.is_none() {
        None
    } else {
        Some(TideExtremes { next_high, next_low })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
