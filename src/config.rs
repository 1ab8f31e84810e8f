//! Service configuration loader - parses tidecast.toml
//!
//! Every field has a working default, so the engine runs with no config
//! file at all; a file only needs the fields it wants to change. The
//! WorldTides key can also come from the `WORLDTIDES_API_KEY` environment
//! variable, which wins over the file so deployments can keep the key out
//! of version control.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::analysis::extrema::ExtremaConfig;

/// Engine configuration, deserialized from `tidecast.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// WorldTides API key. Without one the global provider is disabled and
    /// resolution relies on the gauge and national networks alone.
    pub worldtides_api_key: Option<String>,

    /// Maximum distance to a gauge station for the UK tier (km).
    pub gauge_search_radius_km: f64,

    /// Maximum distance to a curated forecast station for the US tier (km).
    pub national_search_radius_km: f64,

    /// Forward horizon requested from forecast providers (days).
    pub forecast_horizon_days: u32,

    /// Per-request HTTP timeout (seconds).
    pub http_timeout_secs: u64,

    /// How long the discovered gauge station catalog stays fresh (minutes).
    pub station_cache_ttl_minutes: i64,

    /// Turning-point detection tuning for raw gauge readings.
    pub extrema: ExtremaConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            worldtides_api_key: None,
            gauge_search_radius_km: 30.0,
            national_search_radius_km: 100.0,
            forecast_horizon_days: 3,
            http_timeout_secs: 15,
            station_cache_ttl_minutes: 60,
            extrema: ExtremaConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from `tidecast.toml` in the working directory,
    /// falling back to defaults when the file is absent, then applies
    /// environment overrides.
    ///
    /// # Panics
    /// Panics if a config file exists but cannot be read or parsed. This is
    /// intentional — running with a half-applied configuration is worse than
    /// not starting.
    pub fn load() -> Self {
        Self::load_from(Path::new("tidecast.toml"))
    }

    /// Like [`ServiceConfig::load`], for an explicit path.
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
            toml::from_str(&contents)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var("WORLDTIDES_API_KEY") {
            if !key.is_empty() {
                config.worldtides_api_key = Some(key);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_policy() {
        let config = ServiceConfig::default();
        assert_eq!(config.gauge_search_radius_km, 30.0);
        assert_eq!(config.national_search_radius_km, 100.0);
        assert_eq!(config.forecast_horizon_days, 3);
        assert_eq!(config.station_cache_ttl_minutes, 60);
        assert!(config.worldtides_api_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_fields() {
        let config: ServiceConfig =
            toml::from_str("gauge_search_radius_km = 50.0").expect("valid partial config");
        assert_eq!(config.gauge_search_radius_km, 50.0);
        assert_eq!(config.national_search_radius_km, 100.0, "untouched field keeps default");
    }

    #[test]
    fn test_extrema_block_is_parsed() {
        let config: ServiceConfig = toml::from_str(
            "[extrema]\nprominence_m = 0.1\n",
        )
        .expect("valid extrema override");
        assert_eq!(config.extrema.prominence_m, 0.1);
        assert_eq!(
            config.extrema.dedup_window_hours,
            ExtremaConfig::default().dedup_window_hours,
            "untouched extrema field keeps default"
        );
    }

    #[test]
    fn test_api_key_from_file() {
        let config: ServiceConfig =
            toml::from_str(r#"worldtides_api_key = "test-key""#).expect("valid key config");
        assert_eq!(config.worldtides_api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = ServiceConfig::load_from(Path::new("/nonexistent/tidecast.toml"));
        assert_eq!(config.http_timeout_secs, 15);
    }
}
