//! Test fixtures: representative JSON payloads from the three upstreams.
//!
//! These fixtures are structurally complete but truncated to the minimum
//! needed to exercise the parsers.
//!
//! EA flood-monitoring response shapes:
//!   stations:  response.items[]
//!     .stationReference — station id (string)
//!     .label            — display name; OCCASIONALLY AN ARRAY of duplicates
//!     .lat / .long      — WGS84; occasionally arrays, occasionally absent
//!   readings:  response.items[]
//!     .dateTime — ISO 8601 UTC
//!     .value    — meters; occasionally an array of duplicates
//!   The `_sorted` readings endpoint returns most-recent-first.
//!
//! CO-OPS predictions response shape:
//!   response.predictions[]
//!     .t    — "YYYY-MM-DD HH:MM" (GMT when requested with time_zone=gmt)
//!     .v    — height in meters as a STRING
//!     .type — "H" or "L"
//!   Errors arrive as { "error": { "message": ... } } with HTTP 200.
//!
//! WorldTides v3 response shapes:
//!   stations: { status, stations[]: { id, name, lat, lon, timezone } },
//!     sorted by proximity to the query point.
//!   extremes: { status, extremes[]: { dt (unix seconds), date, height,
//!     type ("High"/"Low") } }; errors are { status != 200, error }.

/// Three EA tide gauges: one clean entry (Dover), one with the
/// array-valued metadata quirk (Sheerness), one register-only entry with
/// no coordinates that parsers must drop.
#[cfg(test)]
pub(crate) fn fixture_ea_stations_json() -> &'static str {
    r#"{
      "@context": "http://environment.data.gov.uk/flood-monitoring/meta/context.jsonld",
      "items": [
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/E70024",
          "stationReference": "E70024",
          "label": "Dover",
          "lat": 51.1142,
          "long": 1.3225,
          "type": "TideGauge"
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/E71539",
          "stationReference": "E71539",
          "label": ["Sheerness", "Sheerness"],
          "lat": [51.4456, 51.4456],
          "long": [0.7434, 0.7434],
          "type": "TideGauge"
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/E99001",
          "stationReference": "E99001",
          "label": "Unmapped Gauge",
          "type": "TideGauge"
        }
      ]
    }"#
}

/// A `_sorted` history window at Dover, most-recent-first: four usable
/// readings (one with the array-valued `value` quirk) plus one entry with
/// no value at all, which parsers skip.
#[cfg(test)]
pub(crate) fn fixture_ea_readings_json() -> &'static str {
    r#"{
      "@context": "http://environment.data.gov.uk/flood-monitoring/meta/context.jsonld",
      "items": [
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/data/readings/E70024-level-tidal_level-15_min-mAOD/2024-05-01T06-30-00Z",
          "dateTime": "2024-05-01T06:30:00Z",
          "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E70024-level-tidal_level-15_min-mAOD",
          "value": 5.982
        },
        {
          "dateTime": "2024-05-01T06:15:00Z",
          "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E70024-level-tidal_level-15_min-mAOD",
          "value": 5.844
        },
        {
          "dateTime": "2024-05-01T06:00:00Z",
          "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E70024-level-tidal_level-15_min-mAOD",
          "value": [5.410, 5.410]
        },
        {
          "dateTime": "2024-05-01T05:45:00Z",
          "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E70024-level-tidal_level-15_min-mAOD",
          "value": 5.127
        },
        {
          "dateTime": "2024-05-01T05:30:00Z",
          "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E70024-level-tidal_level-15_min-mAOD"
        }
      ]
    }"#
}

/// The `?latest` endpoint: a single most-recent reading.
#[cfg(test)]
pub(crate) fn fixture_ea_latest_reading_json() -> &'static str {
    r#"{
      "@context": "http://environment.data.gov.uk/flood-monitoring/meta/context.jsonld",
      "items": [
        {
          "dateTime": "2024-05-01T06:45:00Z",
          "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E70024-level-tidal_level-15_min-mAOD",
          "value": 6.104
        }
      ]
    }"#
}

/// One day of hilo predictions at The Battery (station 8518750), metric
/// units, GMT timestamps. Heights are strings — the parser must coerce.
#[cfg(test)]
pub(crate) fn fixture_coops_predictions_json() -> &'static str {
    r#"{
      "predictions": [
        { "t": "2024-05-01 04:36", "v": "1.478", "type": "H" },
        { "t": "2024-05-01 10:48", "v": "0.132", "type": "L" },
        { "t": "2024-05-01 16:54", "v": "1.556", "type": "H" },
        { "t": "2024-05-01 23:06", "v": "0.087", "type": "L" }
      ]
    }"#
}

/// CO-OPS reports errors inside a 200 response.
#[cfg(test)]
pub(crate) fn fixture_coops_error_json() -> &'static str {
    r#"{
      "error": {
        "message": "No Predictions data was found. Please make sure the Datum input is valid."
      }
    }"#
}

/// Two reference stations near a Brittany query point, closest first.
#[cfg(test)]
pub(crate) fn fixture_worldtides_stations_json() -> &'static str {
    r#"{
      "status": 200,
      "callCount": 1,
      "stations": [
        { "id": "SHOM_Brest", "name": "Brest", "lat": 48.3829, "lon": -4.4953, "timezone": "Europe/Paris" },
        { "name": "Concarneau", "lat": 47.8736, "lon": -3.9111, "timezone": "Europe/Paris" }
      ]
    }"#
}

/// A day of extremes off Brest: `dt` in unix seconds, full-word labels.
#[cfg(test)]
pub(crate) fn fixture_worldtides_extremes_json() -> &'static str {
    r#"{
      "status": 200,
      "callCount": 1,
      "requestLat": 48.3829,
      "requestLon": -4.4953,
      "responseDatum": "LAT",
      "extremes": [
        { "dt": 1714533120, "date": "2024-05-01T03:12+0000", "height": 0.212, "type": "Low" },
        { "dt": 1714555560, "date": "2024-05-01T09:26+0000", "height": 6.034, "type": "High" },
        { "dt": 1714577880, "date": "2024-05-01T15:38+0000", "height": 0.374, "type": "Low" },
        { "dt": 1714600200, "date": "2024-05-01T21:50+0000", "height": 6.118, "type": "High" }
      ]
    }"#
}

/// WorldTides failure payload: non-200 status plus a message.
#[cfg(test)]
pub(crate) fn fixture_worldtides_error_json() -> &'static str {
    r#"{
      "status": 400,
      "error": "Invalid API key"
    }"#
}
