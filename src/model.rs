//! Core data types for the tidecast resolution engine.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no logic, no I/O, and no external dependencies beyond serde
//! derives — only types.
//!
//! All timestamps are UTC and all heights are meters; every provider adapter
//! normalizes its upstream's native encoding to these before anything else
//! sees the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Source and classification enums
// ---------------------------------------------------------------------------

/// Which upstream network a station (and the data built from it) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideSource {
    /// Real-time water-level gauge network. Readings only, no forecast.
    Gauge,
    /// National forecast API with a fixed station catalog.
    National,
    /// Global commercial forecast API (API-key gated).
    Global,
}

impl TideSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TideSource::Gauge => "gauge",
            TideSource::National => "national",
            TideSource::Global => "global",
        }
    }
}

/// Canonical turning-point label. Upstreams encode this as 'H'/'L' or
/// 'High'/'Low'; adapters normalize to this enum at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

/// Direction of tide movement at the query instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideTrend {
    Rising,
    Falling,
}

// ---------------------------------------------------------------------------
// Station and observation types
// ---------------------------------------------------------------------------

/// A tide station selected for a query, with its distance from the query
/// point. `distance_km` is computed per query and never cached across
/// queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideStation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub source: TideSource,
}

/// A single raw water-level observation from a gauge station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideReading {
    pub time: DateTime<Utc>,
    pub level_m: f64,
    /// Upstream quality qualifier, where the network provides one.
    pub quality: Option<String>,
}

/// A forecast or locally derived turning point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidePrediction {
    pub time: DateTime<Utc>,
    pub height_m: f64,
    pub kind: TideKind,
}

// ---------------------------------------------------------------------------
// Assembled output types
// ---------------------------------------------------------------------------

/// Tide state at the query instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTide {
    pub height_m: f64,
    pub trend: TideTrend,
    /// The next predicted turning point, when one is known.
    pub next_tide: Option<TidePrediction>,
}

/// The next high and low water events after the query instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideExtremes {
    pub next_high: Option<TidePrediction>,
    pub next_low: Option<TidePrediction>,
}

/// Raw provenance from the gauge network: what was actually observed, and
/// which turning points were derived locally from those observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideGaugeData {
    pub station_reference: String,
    pub latest_reading: Option<TideReading>,
    /// Historical readings, ascending in time.
    pub readings: Vec<TideReading>,
    /// Turning points derived from `readings` (retrospective only).
    pub predictions: Vec<TidePrediction>,
    pub fetched_at: DateTime<Utc>,
}

/// The engine's assembled answer for one coordinate.
///
/// `predictions` is always ascending in time. `current` and `extremes` are
/// absent when the available data cannot support them (e.g. a date-range
/// query has no meaningful "current" state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideData {
    pub station: TideStation,
    pub predictions: Vec<TidePrediction>,
    pub current: Option<CurrentTide>,
    pub extremes: Option<TideExtremes>,
    pub fetched_at: DateTime<Utc>,
    /// Present only for gauge-backed results.
    pub gauge_data: Option<TideGaugeData>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or processing upstream tide data.
///
/// These never cross the provider-adapter boundary: adapters catch them,
/// report once to stderr, and yield `None` so the resolver's fallback chain
/// can continue. A coordinate with no station in range is not an error at
/// all — adapters express that as an ordinary empty result.
#[derive(Debug, PartialEq)]
pub enum TideError {
    /// Non-2xx HTTP response from an upstream API.
    HttpError(u16),
    /// Transport-level failure (DNS, connect, timeout).
    Network(String),
    /// The response body could not be deserialized or normalized.
    ParseError(String),
    /// Structurally valid response with no usable values.
    NoDataAvailable(String),
}

impl std::fmt::Display for TideError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TideError::HttpError(code) => write!(f, "HTTP error: {}", code),
            TideError::Network(msg) => write!(f, "Network error: {}", msg),
            TideError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            TideError::NoDataAvailable(msg) => write!(f, "No data available: {}", msg),
        }
    }
}

impl std::error::Error for TideError {}
