//! Upstream provider adapters.
//!
//! One module per upstream, each owning its URL construction, payload
//! parsing, and normalization (timestamps to UTC, heights to meters,
//! turning-point labels to the canonical enum):
//! - `ea`         — Environment Agency real-time tide gauges (readings only)
//! - `coops`      — NOAA CO-OPS high/low tide predictions
//! - `worldtides` — WorldTides v3 global extremes forecast
//! - `fixtures`   — test-only representative API response payloads
//!
//! Adapters share one contract: [`TideProvider::fetch`] returns `None` for
//! both "no coverage here" and "upstream failed", never an error — every
//! internal failure is caught at this boundary so the resolver's fallback
//! chain can keep going.

use chrono::{DateTime, NaiveDate, Utc};

use crate::analysis::interpolate;
use crate::model::{TideData, TideError, TidePrediction, TideSource, TideStation};

pub mod coops;
pub mod ea;
pub mod fixtures;
pub mod worldtides;

/// The provider contract. Implementations must catch all upstream
/// failures internally (report to stderr, return `None`).
pub trait TideProvider {
    fn source(&self) -> TideSource;

    /// Resolves tide data near a coordinate, or `None` when this provider
    /// has nothing usable there.
    fn fetch(&self, latitude: f64, longitude: f64) -> Option<TideData>;
}

/// A provider that can answer for an arbitrary future date window, not
/// just "now". Only the global forecast network supports this.
pub trait ForecastProvider: TideProvider {
    fn fetch_window(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        days: u32,
    ) -> Option<TideData>;
}

// Providers are usable through shared references, so a caller can lend an
// adapter to a resolver and keep its own handle.
impl<T: TideProvider + ?Sized> TideProvider for &T {
    fn source(&self) -> TideSource {
        (**self).source()
    }

    fn fetch(&self, latitude: f64, longitude: f64) -> Option<TideData> {
        (**self).fetch(latitude, longitude)
    }
}

impl<T: ForecastProvider + ?Sized> ForecastProvider for &T {
    fn fetch_window(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        days: u32,
    ) -> Option<TideData> {
        (**self).fetch_window(latitude, longitude, date, days)
    }
}

/// Shared blocking HTTP client: per-request timeout, JSON accept header
/// added per call site, rustls underneath.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(concat!("tidecast/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("HTTP client construction only fails on malformed builder options")
}

/// Performs a GET and returns the body, mapping transport failures and
/// non-2xx statuses into the domain error.
pub(crate) fn fetch_body(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<String, TideError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| TideError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(TideError::HttpError(response.status().as_u16()));
    }

    response
        .text()
        .map_err(|e| TideError::Network(e.to_string()))
}

/// Builds the standard result shape for a native-forecast provider:
/// current state interpolated from the prediction series, next events
/// selected from it, no gauge provenance.
pub(crate) fn assemble_forecast(
    station: TideStation,
    predictions: Vec<TidePrediction>,
    now: DateTime<Utc>,
) -> TideData {
    TideData {
        current: interpolate::estimate_current(&predictions, now),
        extremes: interpolate::upcoming_extremes(&predictions, now),
        station,
        predictions,
        fetched_at: now,
        gauge_data: None,
    }
}
