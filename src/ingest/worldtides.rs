//! WorldTides v3 global forecast adapter.
//!
//! Commercial worldwide tide extremes, API-key gated:
//!   https://www.worldtides.info/apidocs
//!
//! Two calls per resolution: a `stations` lookup for the nearest reference
//! station (metadata only — the forecast itself is positional), then an
//! `extremes` call for the requested window. The LAT datum is requested on
//! every call so heights stay comparable between queries.
//!
//! Upstream quirks handled here: event times are unix SECONDS (`dt`), and
//! turning-point labels are full words `"High"`/`"Low"`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::analysis::interpolate;
use crate::config::ServiceConfig;
use crate::geo::{self, HasLocation};
use crate::ingest::{
    ForecastProvider, TideProvider, assemble_forecast, fetch_body, http_client,
};
use crate::model::{TideData, TideError, TideKind, TidePrediction, TideSource, TideStation};

const WORLDTIDES_API_BASE: &str = "https://www.worldtides.info/api/v3";

// ---------------------------------------------------------------------------
// Serde structures for WorldTides JSON deserialization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StationsResponse {
    #[serde(default)]
    stations: Vec<RemoteStation>,
}

/// A reference station from the `stations` lookup, already sorted by
/// proximity upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteStation {
    pub id: Option<String>,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl HasLocation for RemoteStation {
    fn location(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

#[derive(Deserialize)]
struct ExtremesResponse {
    status: i64,
    error: Option<String>,
    #[serde(default)]
    extremes: Vec<ExtremeItem>,
}

#[derive(Deserialize)]
struct ExtremeItem {
    /// Unix seconds.
    dt: i64,
    /// Meters relative to the requested datum.
    height: f64,
    /// "High" or "Low".
    #[serde(rename = "type")]
    kind: String,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

pub fn build_stations_url(latitude: f64, longitude: f64, api_key: &str) -> String {
    format!(
        "{}?stations&lat={:.4}&lon={:.4}&key={}",
        WORLDTIDES_API_BASE, latitude, longitude, api_key
    )
}

pub fn build_extremes_url(
    latitude: f64,
    longitude: f64,
    date: NaiveDate,
    days: u32,
    api_key: &str,
) -> String {
    format!(
        "{}?extremes&lat={:.4}&lon={:.4}&date={}&days={}&datum=LAT&key={}",
        WORLDTIDES_API_BASE,
        latitude,
        longitude,
        date.format("%Y-%m-%d"),
        days,
        api_key
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Normalizes a WorldTides turning-point label to the canonical enum.
fn normalize_kind(raw: &str) -> Result<TideKind, TideError> {
    match raw.trim() {
        "High" | "high" => Ok(TideKind::High),
        "Low" | "low" => Ok(TideKind::Low),
        other => Err(TideError::ParseError(format!(
            "unknown extreme type '{}'",
            other
        ))),
    }
}

pub fn parse_stations(json: &str) -> Result<Vec<RemoteStation>, TideError> {
    let response: StationsResponse = serde_json::from_str(json)
        .map_err(|e| TideError::ParseError(format!("stations lookup: {}", e)))?;
    Ok(response.stations)
}

/// Parses an extremes payload into ascending, canonical predictions.
pub fn parse_extremes(json: &str) -> Result<Vec<TidePrediction>, TideError> {
    let response: ExtremesResponse = serde_json::from_str(json)
        .map_err(|e| TideError::ParseError(format!("extremes: {}", e)))?;

    if response.status != 200 {
        let message = response
            .error
            .unwrap_or_else(|| format!("status {}", response.status));
        return Err(TideError::NoDataAvailable(message));
    }
    if response.extremes.is_empty() {
        return Err(TideError::NoDataAvailable(
            "empty extremes array".to_string(),
        ));
    }

    let mut predictions = Vec::with_capacity(response.extremes.len());
    for item in response.extremes {
        let time = DateTime::from_timestamp(item.dt, 0).ok_or_else(|| {
            TideError::ParseError(format!("unrepresentable timestamp {}", item.dt))
        })?;
        predictions.push(TidePrediction {
            time,
            height_m: item.height,
            kind: normalize_kind(&item.kind)?,
        });
    }

    predictions.sort_by_key(|p| p.time);
    Ok(predictions)
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Global forecast provider; the tail of every fallback chain and the only
/// date-addressable source. Constructed only when an API key is present.
pub struct WorldTidesProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    horizon_days: u32,
}

impl WorldTidesProvider {
    /// Returns `None` when no API key is configured — the provider simply
    /// does not exist in the resolution chain then.
    pub fn new(config: &ServiceConfig) -> Option<Self> {
        let api_key = config.worldtides_api_key.clone()?;
        Some(Self {
            client: http_client(config.http_timeout_secs),
            api_key,
            horizon_days: config.forecast_horizon_days,
        })
    }

    /// Resolves the nearest reference station for result metadata. The
    /// forecast itself is positional, so a failed or empty lookup degrades
    /// to an open-water placeholder instead of discarding the forecast.
    fn station_near(&self, latitude: f64, longitude: f64) -> TideStation {
        let lookup = fetch_body(
            &self.client,
            &build_stations_url(latitude, longitude, &self.api_key),
        )
        .and_then(|body| parse_stations(&body));

        let stations = match lookup {
            Ok(stations) => stations,
            Err(e) => {
                eprintln!("WorldTides station lookup failed: {}", e);
                Vec::new()
            }
        };

        match stations.into_iter().next() {
            Some(station) => {
                let distance_km =
                    geo::distance_km(latitude, longitude, station.lat, station.lon);
                TideStation {
                    id: station.id.unwrap_or_else(|| station.name.clone()),
                    name: station.name,
                    latitude: station.lat,
                    longitude: station.lon,
                    distance_km,
                    source: TideSource::Global,
                }
            }
            None => TideStation {
                id: "worldtides-open-water".to_string(),
                name: "Open water".to_string(),
                latitude,
                longitude,
                distance_km: 0.0,
                source: TideSource::Global,
            },
        }
    }

    fn fetch_extremes(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        days: u32,
    ) -> Result<Vec<TidePrediction>, TideError> {
        let body = fetch_body(
            &self.client,
            &build_extremes_url(latitude, longitude, date, days, &self.api_key),
        )?;
        parse_extremes(&body)
    }

    fn try_fetch(&self, latitude: f64, longitude: f64) -> Result<Option<TideData>, TideError> {
        let now = Utc::now();
        let station = self.station_near(latitude, longitude);
        let predictions =
            self.fetch_extremes(latitude, longitude, now.date_naive(), self.horizon_days)?;
        Ok(Some(assemble_forecast(station, predictions, now)))
    }
}

impl TideProvider for WorldTidesProvider {
    fn source(&self) -> TideSource {
        TideSource::Global
    }

    fn fetch(&self, latitude: f64, longitude: f64) -> Option<TideData> {
        match self.try_fetch(latitude, longitude) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("WorldTides forecast fetch failed: {}", e);
                None
            }
        }
    }
}

impl ForecastProvider for WorldTidesProvider {
    fn fetch_window(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        days: u32,
    ) -> Option<TideData> {
        let station = self.station_near(latitude, longitude);
        let result = self
            .fetch_extremes(latitude, longitude, date, days)
            .map(|predictions| {
                TideData {
                    // No current state: the window may be nowhere near "now".
                    current: None,
                    extremes: interpolate::window_extremes(&predictions),
                    station,
                    predictions,
                    fetched_at: Utc::now(),
                    gauge_data: None,
                }
            });

        match result {
            Ok(data) => Some(data),
            Err(e) => {
                eprintln!("WorldTides window fetch failed: {}", e);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
