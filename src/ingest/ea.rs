//! Environment Agency tide gauge adapter.
//!
//! Real-time water levels from the EA flood-monitoring API:
//!   https://environment.data.gov.uk/flood-monitoring/doc/reference
//!
//! The network reports observations only — no forecast — so turning points
//! are derived locally from the reading history (`analysis::extrema`). The
//! station catalog (~200 tide gauges) is discovered remotely and cached
//! in-process; see [`CatalogCache`]. See `fixtures.rs` for annotated
//! examples of the response payloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Mutex;
use std::sync::mpsc;
use threadpool::ThreadPool;

use crate::analysis::extrema::{ExtremaConfig, detect_turning_points};
use crate::analysis::interpolate;
use crate::config::ServiceConfig;
use crate::geo::{self, HasLocation};
use crate::ingest::{TideProvider, fetch_body, http_client};
use crate::model::{
    CurrentTide, TideData, TideError, TideGaugeData, TideReading, TideSource, TideStation,
    TideTrend,
};

const EA_API_BASE: &str = "https://environment.data.gov.uk/flood-monitoring";

/// History window requested for turning-point detection. A day of
/// 15-minute readings covers roughly two tidal cycles.
const HISTORY_WINDOW_HOURS: i64 = 24;
const HISTORY_LIMIT: u32 = 200;

// ---------------------------------------------------------------------------
// Serde structures for EA JSON deserialization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StationsResponse {
    items: Vec<StationItem>,
}

#[derive(Deserialize)]
struct StationItem {
    #[serde(rename = "stationReference")]
    station_reference: String,
    // EA metadata fields are occasionally JSON arrays rather than scalars
    // (duplicate register entries); take the first element when they are.
    #[serde(default, deserialize_with = "scalar_or_first_string")]
    label: Option<String>,
    #[serde(default, deserialize_with = "scalar_or_first_f64")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "scalar_or_first_f64")]
    long: Option<f64>,
}

#[derive(Deserialize)]
struct ReadingsResponse {
    items: Vec<ReadingItem>,
}

#[derive(Deserialize)]
struct ReadingItem {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default, deserialize_with = "scalar_or_first_f64")]
    value: Option<f64>,
}

fn scalar_or_first_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => Some(value),
        Some(OneOrMany::Many(values)) => values.into_iter().next(),
        None => None,
    })
}

fn scalar_or_first_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(f64),
        Many(Vec<f64>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => Some(value),
        Some(OneOrMany::Many(values)) => values.into_iter().next(),
        None => None,
    })
}

// ---------------------------------------------------------------------------
// Station catalog
// ---------------------------------------------------------------------------

/// A tide gauge from the EA discovery endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeStation {
    pub reference: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl HasLocation for GaugeStation {
    fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// In-process station catalog cache with an injectable clock.
///
/// One shared entry is enough: the catalog changes rarely and coarse
/// staleness is acceptable, so on expiry whichever caller arrives next
/// refreshes it for everyone. The clock is injected so expiry is testable
/// without waiting an hour.
pub struct CatalogCache {
    ttl: Duration,
    clock: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    entry: Mutex<Option<CacheEntry>>,
}

struct CacheEntry {
    stations: Vec<GaugeStation>,
    fetched_at: DateTime<Utc>,
}

impl CatalogCache {
    pub fn new(ttl_minutes: i64) -> Self {
        Self::with_clock(ttl_minutes, Box::new(Utc::now))
    }

    pub fn with_clock(
        ttl_minutes: i64,
        clock: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    ) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes),
            clock,
            entry: Mutex::new(None),
        }
    }

    /// Returns the cached catalog when fresh, otherwise runs `refresh` and
    /// stores its result. A failed refresh leaves any stale entry in place
    /// for the next attempt.
    pub fn get_or_refresh<F>(&self, refresh: F) -> Result<Vec<GaugeStation>, TideError>
    where
        F: FnOnce() -> Result<Vec<GaugeStation>, TideError>,
    {
        let mut guard = self.entry.lock().expect("catalog cache lock poisoned");
        let now = (self.clock)();

        if let Some(entry) = guard.as_ref() {
            if now - entry.fetched_at <= self.ttl {
                return Ok(entry.stations.clone());
            }
        }

        let stations = refresh()?;
        *guard = Some(CacheEntry { stations: stations.clone(), fetched_at: now });
        Ok(stations)
    }
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Discovery URL for all tide gauges reporting water level.
pub fn build_stations_url() -> String {
    format!("{}/id/stations?parameter=level&type=TideGauge&_limit=500", EA_API_BASE)
}

/// URL for the single most recent reading at a station.
pub fn build_latest_reading_url(station_reference: &str) -> String {
    format!("{}/id/stations/{}/readings?latest", EA_API_BASE, station_reference)
}

/// URL for the reading history since a cutoff, most recent first.
pub fn build_history_url(
    station_reference: &str,
    since: DateTime<Utc>,
    limit: u32,
) -> String {
    let since_param = since.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    format!(
        "{}/id/stations/{}/readings?_sorted&since={}&_limit={}",
        EA_API_BASE,
        station_reference,
        urlencoding::encode(&since_param),
        limit
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses the discovery payload into gauge stations, dropping entries with
/// no usable coordinates (the API carries a few register-only stations).
pub fn parse_stations(json: &str) -> Result<Vec<GaugeStation>, TideError> {
    let response: StationsResponse = serde_json::from_str(json)
        .map_err(|e| TideError::ParseError(format!("station discovery: {}", e)))?;

    let stations: Vec<GaugeStation> = response
        .items
        .into_iter()
        .filter_map(|item| {
            let latitude = item.lat?;
            let longitude = item.long?;
            let name = item
                .label
                .unwrap_or_else(|| item.station_reference.clone());
            Some(GaugeStation {
                reference: item.station_reference,
                name,
                latitude,
                longitude,
            })
        })
        .collect();

    if stations.is_empty() {
        return Err(TideError::NoDataAvailable(
            "no tide gauge stations in discovery response".to_string(),
        ));
    }

    Ok(stations)
}

/// Parses a readings payload into ascending-time readings.
///
/// The `_sorted` endpoint returns most-recent-first; output here is always
/// ascending. Entries with an unusable value or timestamp are skipped with
/// a warning rather than failing the whole window.
pub fn parse_readings(json: &str) -> Result<Vec<TideReading>, TideError> {
    let response: ReadingsResponse = serde_json::from_str(json)
        .map_err(|e| TideError::ParseError(format!("readings: {}", e)))?;

    let mut readings = Vec::with_capacity(response.items.len());
    for item in response.items {
        let Some(level_m) = item.value else {
            continue;
        };
        let time = match DateTime::parse_from_rfc3339(&item.date_time) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                eprintln!("Warning: skipping reading with bad timestamp '{}': {}", item.date_time, e);
                continue;
            }
        };
        readings.push(TideReading { time, level_m, quality: None });
    }

    readings.sort_by_key(|r| r.time);
    Ok(readings)
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Real-time gauge provider for the UK tier.
pub struct EaGaugeProvider {
    client: reqwest::blocking::Client,
    catalog: CatalogCache,
    search_radius_km: f64,
    extrema: ExtremaConfig,
    pool: ThreadPool,
}

enum FetchSlot {
    Latest,
    History,
}

impl EaGaugeProvider {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            client: http_client(config.http_timeout_secs),
            catalog: CatalogCache::new(config.station_cache_ttl_minutes),
            search_radius_km: config.gauge_search_radius_km,
            extrema: config.extrema.clone(),
            // The latest-reading and history fetches are independent and
            // run in parallel; two workers cover one in-flight query.
            pool: ThreadPool::new(2),
        }
    }

    fn try_fetch(&self, latitude: f64, longitude: f64) -> Result<Option<TideData>, TideError> {
        let stations = self.catalog.get_or_refresh(|| {
            let body = fetch_body(&self.client, &build_stations_url())?;
            parse_stations(&body)
        })?;

        let Some((station, distance_km)) =
            geo::find_nearest(&stations, latitude, longitude, self.search_radius_km)
        else {
            return Ok(None); // coverage gap, not an error
        };

        let now = Utc::now();
        let since = now - Duration::hours(HISTORY_WINDOW_HOURS);

        let jobs = [
            (FetchSlot::Latest, build_latest_reading_url(&station.reference)),
            (FetchSlot::History, build_history_url(&station.reference, since, HISTORY_LIMIT)),
        ];

        let (tx, rx) = mpsc::channel();
        for (slot, url) in jobs {
            let tx = tx.clone();
            let client = self.client.clone();
            self.pool.execute(move || {
                let _ = tx.send((slot, fetch_body(&client, &url)));
            });
        }
        drop(tx);

        let mut latest_body = None;
        let mut history_body = None;
        for (slot, result) in rx {
            match slot {
                FetchSlot::Latest => latest_body = Some(result),
                FetchSlot::History => history_body = Some(result),
            }
        }

        // Both fetches are required inputs; a dead worker counts as a
        // transport failure.
        let latest_json = latest_body
            .ok_or_else(|| TideError::Network("latest-reading worker died".to_string()))??;
        let history_json = history_body
            .ok_or_else(|| TideError::Network("history worker died".to_string()))??;

        let readings = parse_readings(&history_json)?;
        let latest = parse_readings(&latest_json)?
            .pop()
            .or_else(|| readings.last().cloned());
        let Some(latest) = latest else {
            return Err(TideError::NoDataAvailable(format!(
                "station {} returned no readings",
                station.reference
            )));
        };

        Ok(Some(self.assemble(station, distance_km, latest, readings, now)))
    }

    fn assemble(
        &self,
        station: &GaugeStation,
        distance_km: f64,
        latest: TideReading,
        readings: Vec<TideReading>,
        now: DateTime<Utc>,
    ) -> TideData {
        let predictions = detect_turning_points(&readings, &self.extrema);

        // Current height is the live reading passed through, never an
        // interpolation.
        let current = trend_from_readings(&readings, &latest).map(|trend| CurrentTide {
            height_m: latest.level_m,
            trend,
            next_tide: predictions.iter().find(|p| p.time > now).cloned(),
        });

        let gauge_data = TideGaugeData {
            station_reference: station.reference.clone(),
            latest_reading: Some(latest),
            readings,
            predictions: predictions.clone(),
            fetched_at: now,
        };

        TideData {
            station: TideStation {
                id: station.reference.clone(),
                name: station.name.clone(),
                latitude: station.latitude,
                longitude: station.longitude,
                distance_km,
                source: TideSource::Gauge,
            },
            extremes: interpolate::upcoming_extremes(&predictions, now),
            predictions,
            current,
            fetched_at: now,
            gauge_data: Some(gauge_data),
        }
    }
}

/// Rising or falling, judged from the latest level against the mean of the
/// three readings before it. `None` when there is no prior reading to
/// compare against.
fn trend_from_readings(readings: &[TideReading], latest: &TideReading) -> Option<TideTrend> {
    let prior: Vec<f64> = readings
        .iter()
        .filter(|r| r.time < latest.time)
        .map(|r| r.level_m)
        .collect();
    if prior.is_empty() {
        return None;
    }

    let recent = &prior[prior.len().saturating_sub(3)..];
    let mean = recent.iter().sum::<f64>() / recent.len() as f64;

    Some(if latest.level_m > mean {
        TideTrend::Rising
    } else {
        TideTrend::Falling
    })
}

impl TideProvider for EaGaugeProvider {
    fn source(&self) -> TideSource {
        TideSource::Gauge
    }

    fn fetch(&self, latitude: f64, longitude: f64) -> Option<TideData> {
        match self.try_fetch(latitude, longitude) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("EA gauge fetch failed: {}", e);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    // --- URL construction ---------------------------------------------------

    #[test]
    fn test_stations_url_filters_to_tide_gauges() {
        let url = build_stations_url();
        assert!(url.contains("environment.data.gov.uk/flood-monitoring"));
        assert!(url.contains("parameter=level"), "must filter to level stations");
        assert!(url.contains("type=TideGauge"), "must filter to tide gauges");
    }

    #[test]
    fn test_latest_reading_url_targets_station() {
        let url = build_latest_reading_url("E70024");
        assert!(url.contains("/id/stations/E70024/readings"));
        assert!(url.ends_with("?latest"));
    }

    #[test]
    fn test_history_url_encodes_since_timestamp() {
        let since = Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap();
        let url = build_history_url("E70024", since, 200);
        assert!(url.contains("_sorted"), "history must request sorted output");
        assert!(url.contains("_limit=200"));
        assert!(
            url.contains("since=2024-05-01T06%3A30%3A00Z"),
            "colons in the since parameter must be percent-encoded, got: {}",
            url
        );
    }

    // --- Station discovery parsing ------------------------------------------

    #[test]
    fn test_parse_stations_returns_coordinates_and_labels() {
        let stations = parse_stations(fixture_ea_stations_json())
            .expect("valid discovery fixture should parse");

        let dover = stations
            .iter()
            .find(|s| s.reference == "E70024")
            .expect("should find Dover");
        assert_eq!(dover.name, "Dover");
        assert!((dover.latitude - 51.1142).abs() < 1e-4);
        assert!((dover.longitude - 1.3225).abs() < 1e-4);
    }

    #[test]
    fn test_parse_stations_takes_first_of_array_valued_fields() {
        // EA register duplicates surface as arrays for label/lat/long; the
        // first element is the usable one.
        let stations = parse_stations(fixture_ea_stations_json()).expect("should parse");
        let sheerness = stations
            .iter()
            .find(|s| s.reference == "E71539")
            .expect("array-valued station should survive parsing");
        assert_eq!(sheerness.name, "Sheerness");
        assert!((sheerness.latitude - 51.4456).abs() < 1e-4);
    }

    #[test]
    fn test_parse_stations_drops_entries_without_coordinates() {
        let stations = parse_stations(fixture_ea_stations_json()).expect("should parse");
        assert!(
            !stations.iter().any(|s| s.reference == "E99001"),
            "register-only station without coordinates must be dropped"
        );
    }

    #[test]
    fn test_parse_stations_malformed_json_is_parse_error() {
        assert!(matches!(
            parse_stations("{ not json"),
            Err(TideError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_stations_empty_items_is_no_data() {
        assert!(matches!(
            parse_stations(r#"{ "items": [] }"#),
            Err(TideError::NoDataAvailable(_))
        ));
    }

    // --- Readings parsing ----------------------------------------------------

    #[test]
    fn test_parse_readings_normalizes_to_ascending_order() {
        let readings = parse_readings(fixture_ea_readings_json())
            .expect("valid readings fixture should parse");
        assert!(readings.len() >= 4);
        for pair in readings.windows(2) {
            assert!(
                pair[0].time < pair[1].time,
                "readings must be ascending after normalization"
            );
        }
    }

    #[test]
    fn test_parse_readings_values_are_meters() {
        let readings = parse_readings(fixture_ea_readings_json()).expect("should parse");
        let last = readings.last().expect("non-empty");
        assert!(
            (last.level_m - 5.982).abs() < 1e-9,
            "most recent reading should be 5.982 m, got {}",
            last.level_m
        );
    }

    #[test]
    fn test_parse_readings_takes_first_of_array_valued_reading() {
        // The known EA quirk: `value` occasionally arrives as a two-element
        // array of duplicates.
        let readings = parse_readings(fixture_ea_readings_json()).expect("should parse");
        assert!(
            readings.iter().any(|r| (r.level_m - 5.410).abs() < 1e-9),
            "array-valued reading should contribute its first element"
        );
    }

    #[test]
    fn test_parse_latest_reading_fixture_yields_single_reading() {
        let readings = parse_readings(fixture_ea_latest_reading_json()).expect("should parse");
        assert_eq!(readings.len(), 1);
        assert!((readings[0].level_m - 6.104).abs() < 1e-9);
    }

    #[test]
    fn test_parse_readings_empty_items_is_ok_and_empty() {
        let readings = parse_readings(r#"{ "items": [] }"#).expect("empty window is valid");
        assert!(readings.is_empty());
    }

    // --- Catalog cache -------------------------------------------------------

    fn test_station() -> GaugeStation {
        GaugeStation {
            reference: "E70024".to_string(),
            name: "Dover".to_string(),
            latitude: 51.1142,
            longitude: 1.3225,
        }
    }

    #[test]
    fn test_cache_serves_fresh_entry_without_refreshing() {
        let cache = CatalogCache::new(60);
        let first = cache
            .get_or_refresh(|| Ok(vec![test_station()]))
            .expect("initial refresh succeeds");
        assert_eq!(first.len(), 1);

        let second = cache
            .get_or_refresh(|| panic!("fresh cache must not refresh"))
            .expect("served from cache");
        assert_eq!(second, first);
    }

    #[test]
    fn test_cache_refreshes_after_ttl_expiry() {
        // Injected clock: starts at a fixed instant, then jumps 61 minutes.
        let offset_minutes = Arc::new(AtomicI64::new(0));
        let clock_offset = Arc::clone(&offset_minutes);
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let cache = CatalogCache::with_clock(
            60,
            Box::new(move || base + Duration::minutes(clock_offset.load(Ordering::SeqCst))),
        );

        cache
            .get_or_refresh(|| Ok(vec![test_station()]))
            .expect("initial refresh");

        offset_minutes.store(61, Ordering::SeqCst);
        let mut refreshed = false;
        cache
            .get_or_refresh(|| {
                refreshed = true;
                Ok(vec![test_station(), GaugeStation {
                    reference: "E71539".to_string(),
                    name: "Sheerness".to_string(),
                    latitude: 51.4456,
                    longitude: 0.7434,
                }])
            })
            .expect("refresh after expiry");
        assert!(refreshed, "expired cache must call the refresh closure");

        let catalog = cache
            .get_or_refresh(|| panic!("just-refreshed cache must not refresh again"))
            .expect("served from cache");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_cache_failed_refresh_propagates_error() {
        let cache = CatalogCache::new(60);
        let result = cache.get_or_refresh(|| Err(TideError::HttpError(503)));
        assert_eq!(result, Err(TideError::HttpError(503)));
    }

    // --- Result assembly -----------------------------------------------------

    #[test]
    fn test_current_height_is_latest_reading_passthrough() {
        let provider = EaGaugeProvider::new(&ServiceConfig::default());
        let station = test_station();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap();
        let readings: Vec<TideReading> = (0..6)
            .map(|i| reading_at(i * 15, 5.0 + 0.1 * i as f64))
            .collect();
        let latest = reading_at(90, 5.75);

        let data = provider.assemble(&station, 8.4, latest, readings, now);

        let current = data.current.expect("trend is derivable from six readings");
        assert_eq!(
            current.height_m, 5.75,
            "current height must be the raw reading, never interpolated"
        );
        assert_eq!(current.trend, TideTrend::Rising);
        assert_eq!(data.station.distance_km, 8.4);
        assert_eq!(data.station.source, TideSource::Gauge);
        assert!(data.gauge_data.is_some(), "raw provenance must be attached");
    }

    // --- Trend derivation ----------------------------------------------------

    fn reading_at(minutes: i64, level_m: f64) -> TideReading {
        TideReading {
            time: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
            level_m,
            quality: None,
        }
    }

    #[test]
    fn test_trend_rising_when_latest_above_recent_mean() {
        let readings = vec![
            reading_at(0, 1.0),
            reading_at(15, 1.2),
            reading_at(30, 1.4),
            reading_at(45, 1.6),
        ];
        let latest = reading_at(60, 1.8);
        assert_eq!(
            trend_from_readings(&readings, &latest),
            Some(TideTrend::Rising)
        );
    }

    #[test]
    fn test_trend_falling_when_latest_below_recent_mean() {
        let readings = vec![reading_at(0, 2.0), reading_at(15, 1.8), reading_at(30, 1.6)];
        let latest = reading_at(45, 1.4);
        assert_eq!(
            trend_from_readings(&readings, &latest),
            Some(TideTrend::Falling)
        );
    }

    #[test]
    fn test_trend_unknown_without_prior_readings() {
        let latest = reading_at(0, 1.4);
        assert_eq!(trend_from_readings(&[], &latest), None);
    }
}
