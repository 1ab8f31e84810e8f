//! NOAA CO-OPS tide predictions adapter.
//!
//! High/low water forecasts from the CO-OPS data API:
//!   https://api.tidesandcurrents.noaa.gov/api/prod/
//!
//! Unlike the gauge network this is a true forecast source, so results are
//! assembled directly from the returned predictions — no local turning
//! point derivation. Station selection uses the curated registry in
//! `stations` (the API has no nearest-station discovery call).
//!
//! Upstream quirks handled here: heights arrive as STRINGS even though
//! they are numbers, timestamps are `"YYYY-MM-DD HH:MM"` with no zone
//! marker (GMT because the request says `time_zone=gmt`), and labels are
//! single letters `'H'`/`'L'`.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::config::ServiceConfig;
use crate::geo;
use crate::ingest::{TideProvider, assemble_forecast, fetch_body, http_client};
use crate::model::{TideData, TideError, TideKind, TidePrediction, TideSource, TideStation};
use crate::stations::FORECAST_STATION_REGISTRY;

const COOPS_API_BASE: &str = "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter";

// ---------------------------------------------------------------------------
// Serde structures for CO-OPS JSON deserialization
// ---------------------------------------------------------------------------

/// CO-OPS returns either `predictions` or an `error` object, never both.
#[derive(Deserialize)]
struct PredictionsEnvelope {
    predictions: Option<Vec<HiloPrediction>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct HiloPrediction {
    /// Timestamp string, e.g. "2024-05-01 04:36" (GMT per request).
    t: String,
    /// Height in meters as a STRING, e.g. "1.234".
    v: String,
    /// "H" or "L".
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds a hilo predictions URL for a station and an inclusive date
/// range. Metric units and GMT timestamps are requested so parsing never
/// has to guess.
pub fn build_predictions_url(station_id: &str, begin: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}?product=predictions&application=tidecast&begin_date={}&end_date={}&datum=MLLW&station={}&time_zone=gmt&units=metric&interval=hilo&format=json",
        COOPS_API_BASE,
        begin.format("%Y%m%d"),
        end.format("%Y%m%d"),
        station_id
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Normalizes a CO-OPS turning-point label to the canonical enum.
fn normalize_kind(raw: &str) -> Result<TideKind, TideError> {
    match raw.trim() {
        "H" | "h" => Ok(TideKind::High),
        "L" | "l" => Ok(TideKind::Low),
        other => Err(TideError::ParseError(format!(
            "unknown prediction type '{}'",
            other
        ))),
    }
}

/// Parses a predictions payload into ascending, canonical predictions.
pub fn parse_predictions(json: &str) -> Result<Vec<TidePrediction>, TideError> {
    let envelope: PredictionsEnvelope = serde_json::from_str(json)
        .map_err(|e| TideError::ParseError(format!("predictions: {}", e)))?;

    if let Some(error) = envelope.error {
        return Err(TideError::NoDataAvailable(error.message));
    }

    let items = envelope.predictions.ok_or_else(|| {
        TideError::ParseError("response carries neither predictions nor error".to_string())
    })?;
    if items.is_empty() {
        return Err(TideError::NoDataAvailable(
            "empty predictions array".to_string(),
        ));
    }

    let mut predictions = Vec::with_capacity(items.len());
    for item in items {
        let time = NaiveDateTime::parse_from_str(&item.t, "%Y-%m-%d %H:%M")
            .map_err(|e| TideError::ParseError(format!("bad timestamp '{}': {}", item.t, e)))?
            .and_utc();
        let height_m: f64 = item
            .v
            .parse()
            .map_err(|e| TideError::ParseError(format!("bad height '{}': {}", item.v, e)))?;
        predictions.push(TidePrediction {
            time,
            height_m,
            kind: normalize_kind(&item.kind)?,
        });
    }

    predictions.sort_by_key(|p| p.time);
    Ok(predictions)
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// National forecast provider for the US tier.
pub struct CoopsProvider {
    client: reqwest::blocking::Client,
    search_radius_km: f64,
    horizon_days: u32,
}

impl CoopsProvider {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            client: http_client(config.http_timeout_secs),
            search_radius_km: config.national_search_radius_km,
            horizon_days: config.forecast_horizon_days,
        }
    }

    fn try_fetch(&self, latitude: f64, longitude: f64) -> Result<Option<TideData>, TideError> {
        let Some((station, distance_km)) = geo::find_nearest(
            FORECAST_STATION_REGISTRY,
            latitude,
            longitude,
            self.search_radius_km,
        ) else {
            return Ok(None); // coverage gap, not an error
        };

        let now = Utc::now();
        let begin = now.date_naive();
        let end = begin + Duration::days(self.horizon_days as i64);

        let body = fetch_body(&self.client, &build_predictions_url(station.id, begin, end))?;
        let predictions = parse_predictions(&body)?;

        Ok(Some(assemble_forecast(
            TideStation {
                id: station.id.to_string(),
                name: station.name.to_string(),
                latitude: station.latitude,
                longitude: station.longitude,
                distance_km,
                source: TideSource::National,
            },
            predictions,
            now,
        )))
    }
}

impl TideProvider for CoopsProvider {
    fn source(&self) -> TideSource {
        TideSource::National
    }

    fn fetch(&self, latitude: f64, longitude: f64) -> Option<TideData> {
        match self.try_fetch(latitude, longitude) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("CO-OPS forecast fetch failed: {}", e);
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
    use chrono::{TimeZone, Timelike};

    // --- URL construction ---------------------------------------------------

    #[test]
    fn test_predictions_url_requests_hilo_metric_gmt() {
        let begin = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        let url = build_predictions_url("8518750", begin, end);

        assert!(url.contains("api.tidesandcurrents.noaa.gov"));
        assert!(url.contains("station=8518750"));
        assert!(url.contains("begin_date=20240501"), "dates must be YYYYMMDD");
        assert!(url.contains("end_date=20240504"));
        assert!(url.contains("interval=hilo"), "must request turning points only");
        assert!(url.contains("units=metric"), "heights must be meters");
        assert!(url.contains("time_zone=gmt"), "timestamps must be GMT");
        assert!(url.contains("format=json"));
    }

    // --- Parsing: happy path ------------------------------------------------

    #[test]
    fn test_parse_battery_predictions_values_and_kinds() {
        let predictions = parse_predictions(fixture_coops_predictions_json())
            .expect("valid fixture should parse");
        assert_eq!(predictions.len(), 4);

        let first = &predictions[0];
        assert_eq!(first.kind, TideKind::High);
        assert!(
            (first.height_m - 1.478).abs() < 1e-9,
            "string-encoded height must become meters, got {}",
            first.height_m
        );
        assert_eq!(
            first.time,
            Utc.with_ymd_and_hms(2024, 5, 1, 4, 36, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_predictions_alternate_high_low() {
        let predictions = parse_predictions(fixture_coops_predictions_json()).expect("parses");
        let kinds: Vec<TideKind> = predictions.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![TideKind::High, TideKind::Low, TideKind::High, TideKind::Low]
        );
    }

    #[test]
    fn test_parse_predictions_are_time_ascending() {
        let predictions = parse_predictions(fixture_coops_predictions_json()).expect("parses");
        for pair in predictions.windows(2) {
            assert!(pair[0].time < pair[1].time);
        }
        assert_eq!(predictions[0].time.hour(), 4);
    }

    // --- Parsing: error and edge cases --------------------------------------

    #[test]
    fn test_parse_error_envelope_is_no_data() {
        let result = parse_predictions(fixture_coops_error_json());
        match result {
            Err(TideError::NoDataAvailable(message)) => {
                assert!(message.contains("No Predictions data"), "got: {}", message)
            }
            other => panic!("error envelope should map to NoDataAvailable, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_predictions_is_no_data() {
        let result = parse_predictions(r#"{ "predictions": [] }"#);
        assert!(matches!(result, Err(TideError::NoDataAvailable(_))));
    }

    #[test]
    fn test_parse_malformed_json_is_parse_error() {
        assert!(matches!(
            parse_predictions("{{{"),
            Err(TideError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_unknown_type_label_is_parse_error() {
        let json = r#"{ "predictions": [ { "t": "2024-05-01 04:36", "v": "1.0", "type": "X" } ] }"#;
        assert!(matches!(
            parse_predictions(json),
            Err(TideError::ParseError(_))
        ));
    }

    #[test]
    fn test_normalize_kind_accepts_both_cases() {
        assert_eq!(normalize_kind("H").unwrap(), TideKind::High);
        assert_eq!(normalize_kind("l").unwrap(), TideKind::Low);
        assert!(normalize_kind("High").is_err(), "full words are a different upstream's encoding");
    }
}
