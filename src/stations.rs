//! Curated station registry for the national forecast provider.
//!
//! The CO-OPS predictions API has no usable nearest-station discovery call,
//! so this crate ships a small curated list of reference tide stations
//! spread across the coasts the national routes cover. This is the single
//! source of truth for CO-OPS station ids — other modules reference
//! stations from here rather than hardcoding ids.

use crate::geo::HasLocation;

/// Metadata for a single CO-OPS reference tide station.
pub struct ForecastStation {
    /// 7-digit CO-OPS station id.
    pub id: &'static str,
    /// Official station name.
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

impl HasLocation for ForecastStation {
    fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Reference tide stations, ordered roughly Atlantic → Gulf → Pacific →
/// Alaska → Hawaii → Caribbean.
///
/// Sources:
///   - Station ids and positions: CO-OPS station listings
///     (tidesandcurrents.noaa.gov)
pub static FORECAST_STATION_REGISTRY: &[ForecastStation] = &[
    ForecastStation {
        id: "8443970",
        name: "Boston, MA",
        latitude: 42.3539,
        longitude: -71.0503,
    },
    ForecastStation {
        id: "8518750",
        name: "The Battery, NY",
        latitude: 40.7006,
        longitude: -74.0142,
    },
    ForecastStation {
        id: "8545240",
        name: "Philadelphia, PA",
        latitude: 39.9333,
        longitude: -75.1417,
    },
    ForecastStation {
        id: "8638610",
        name: "Sewells Point, VA",
        latitude: 36.9467,
        longitude: -76.3300,
    },
    ForecastStation {
        id: "8661070",
        name: "Springmaid Pier, SC",
        latitude: 33.6550,
        longitude: -78.9183,
    },
    ForecastStation {
        id: "8723214",
        name: "Virginia Key, FL",
        latitude: 25.7314,
        longitude: -80.1618,
    },
    ForecastStation {
        id: "8724580",
        name: "Key West, FL",
        latitude: 24.5508,
        longitude: -81.8081,
    },
    ForecastStation {
        id: "8729840",
        name: "Pensacola, FL",
        latitude: 30.4044,
        longitude: -87.2112,
    },
    ForecastStation {
        id: "8747437",
        name: "Bay Waveland Yacht Club, MS",
        latitude: 30.3264,
        longitude: -89.3258,
    },
    ForecastStation {
        id: "8771341",
        name: "Galveston Bay Entrance, TX",
        latitude: 29.3573,
        longitude: -94.7248,
    },
    ForecastStation {
        id: "9410230",
        name: "La Jolla, CA",
        latitude: 32.8669,
        longitude: -117.2571,
    },
    ForecastStation {
        id: "9414290",
        name: "San Francisco, CA",
        latitude: 37.8063,
        longitude: -122.4659,
    },
    ForecastStation {
        id: "9435380",
        name: "South Beach, OR",
        latitude: 44.6254,
        longitude: -124.0449,
    },
    ForecastStation {
        id: "9447130",
        name: "Seattle, WA",
        latitude: 47.6026,
        longitude: -122.3393,
    },
    ForecastStation {
        id: "9451600",
        name: "Sitka, AK",
        latitude: 57.0513,
        longitude: -135.3420,
    },
    ForecastStation {
        id: "9455920",
        name: "Anchorage, AK",
        latitude: 61.2375,
        longitude: -149.8900,
    },
    ForecastStation {
        id: "1612340",
        name: "Honolulu, HI",
        latitude: 21.3067,
        longitude: -157.8670,
    },
    ForecastStation {
        id: "1617760",
        name: "Hilo, Hilo Bay, HI",
        latitude: 19.7303,
        longitude: -155.0600,
    },
    ForecastStation {
        id: "9755371",
        name: "San Juan, PR",
        latitude: 18.4592,
        longitude: -66.1164,
    },
];

/// Looks up a station by CO-OPS id. Returns `None` if not found.
pub fn find_station(id: &str) -> Option<&'static ForecastStation> {
    FORECAST_STATION_REGISTRY.iter().find(|s| s.id == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TideSource;
    use crate::regions::ROUTING_TABLE;

    #[test]
    fn test_all_station_ids_are_valid_coops_format() {
        // CO-OPS station ids are 7-digit numeric strings. An invalid id
        // would make the predictions API return an error envelope instead
        // of data for that station.
        for station in FORECAST_STATION_REGISTRY {
            assert_eq!(
                station.id.len(),
                7,
                "id for '{}' should be 7 digits, got '{}'",
                station.name,
                station.id
            );
            assert!(
                station.id.chars().all(|c| c.is_ascii_digit()),
                "id for '{}' should be numeric, got '{}'",
                station.name,
                station.id
            );
        }
    }

    #[test]
    fn test_no_duplicate_station_ids() {
        let mut seen = std::collections::HashSet::new();
        for station in FORECAST_STATION_REGISTRY {
            assert!(
                seen.insert(station.id),
                "duplicate station id '{}' in FORECAST_STATION_REGISTRY",
                station.id
            );
        }
    }

    #[test]
    fn test_coordinates_are_plausible() {
        for station in FORECAST_STATION_REGISTRY {
            assert!(
                station.latitude > -90.0 && station.latitude < 90.0,
                "latitude out of range for '{}'",
                station.name
            );
            assert!(
                station.longitude > -180.0 && station.longitude < 180.0,
                "longitude out of range for '{}'",
                station.name
            );
        }
    }

    #[test]
    fn test_every_station_lies_in_a_national_route_box() {
        // A station outside every national routing box is unreachable: the
        // resolver would never consult the catalog for coordinates near it.
        for station in FORECAST_STATION_REGISTRY {
            let covered = ROUTING_TABLE.iter().any(|r| {
                r.source == TideSource::National
                    && r.contains(station.latitude, station.longitude)
            });
            assert!(
                covered,
                "station '{}' ({}, {}) is outside every national route",
                station.name, station.latitude, station.longitude
            );
        }
    }

    #[test]
    fn test_find_station_returns_correct_entry() {
        let battery = find_station("8518750").expect("The Battery should be in the registry");
        assert!(battery.name.contains("Battery"));
    }

    #[test]
    fn test_find_station_returns_none_for_unknown_id() {
        assert!(find_station("0000000").is_none());
    }
}
