//! Regional routing table for provider selection.
//!
//! The resolver walks `ROUTING_TABLE` in order and attempts the named source
//! for every region containing the query point; the global provider is the
//! unconditional tail of the chain and is not listed here. Keeping the
//! routes as data — an ordered list of (bounding box, source) pairs with
//! pure predicates — means a new regional provider is one new entry, not a
//! rewrite of the orchestrator.

use crate::model::TideSource;

/// A coarse latitude/longitude box. Coarse is fine here: the boxes only
/// decide which providers are worth asking, and each provider then applies
/// its own station-distance cutoff.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// One prioritized regional route.
pub struct RegionRoute {
    pub name: &'static str,
    pub bounds: BoundingBox,
    pub source: TideSource,
}

impl RegionRoute {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.bounds.contains(lat, lng)
    }
}

/// Regional precedence, highest priority first.
///
/// The UK entry routes to the real-time gauge network; the US entries route
/// to the national forecast catalog. Box extents:
///   - UK: covers the British Isles including Shetland.
///   - Continental US: Atlantic to Pacific coasts, Gulf included.
///   - Alaska: Aleutians east of the antimeridian through the panhandle.
///   - Hawaii, Caribbean (Puerto Rico / USVI): island groups.
pub static ROUTING_TABLE: &[RegionRoute] = &[
    RegionRoute {
        name: "United Kingdom",
        bounds: BoundingBox { min_lat: 49.0, max_lat: 61.0, min_lng: -11.0, max_lng: 2.0 },
        source: TideSource::Gauge,
    },
    RegionRoute {
        name: "Continental US",
        bounds: BoundingBox { min_lat: 24.0, max_lat: 50.0, min_lng: -125.0, max_lng: -66.0 },
        source: TideSource::National,
    },
    RegionRoute {
        name: "Alaska",
        bounds: BoundingBox { min_lat: 51.0, max_lat: 72.0, min_lng: -170.0, max_lng: -129.0 },
        source: TideSource::National,
    },
    RegionRoute {
        name: "Hawaii",
        bounds: BoundingBox { min_lat: 18.0, max_lat: 23.0, min_lng: -161.0, max_lng: -154.0 },
        source: TideSource::National,
    },
    RegionRoute {
        name: "Caribbean (PR/USVI)",
        bounds: BoundingBox { min_lat: 17.0, max_lat: 19.0, min_lng: -68.0, max_lng: -64.0 },
        source: TideSource::National,
    },
];

/// Routes containing the point, in priority order.
pub fn routes_for(lat: f64, lng: f64) -> impl Iterator<Item = &'static RegionRoute> {
    ROUTING_TABLE.iter().filter(move |r| r.contains(lat, lng))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_london_routes_to_gauge_first() {
        let routes: Vec<_> = routes_for(51.5, -0.1).collect();
        assert!(!routes.is_empty(), "London must match at least one route");
        assert_eq!(routes[0].source, TideSource::Gauge);
    }

    #[test]
    fn test_new_york_routes_to_national_only() {
        let routes: Vec<_> = routes_for(40.7, -74.0).collect();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].source, TideSource::National);
    }

    #[test]
    fn test_honolulu_and_san_juan_route_to_national() {
        for (lat, lng) in [(21.3, -157.9), (18.46, -66.12)] {
            let routes: Vec<_> = routes_for(lat, lng).collect();
            assert_eq!(routes.len(), 1, "({}, {}) should match one route", lat, lng);
            assert_eq!(routes[0].source, TideSource::National);
        }
    }

    #[test]
    fn test_anchorage_routes_to_national() {
        let routes: Vec<_> = routes_for(61.22, -149.89).collect();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].name, "Alaska");
    }

    #[test]
    fn test_tokyo_matches_no_regional_route() {
        assert_eq!(routes_for(35.68, 139.69).count(), 0);
    }

    #[test]
    fn test_uk_route_outranks_everything_in_table() {
        assert_eq!(ROUTING_TABLE[0].source, TideSource::Gauge);
    }

    #[test]
    fn test_uk_and_us_boxes_do_not_overlap() {
        // The gauge and national networks must never compete for a point;
        // precedence would silently hide the national data if they did.
        let uk = &ROUTING_TABLE[0].bounds;
        for route in &ROUTING_TABLE[1..] {
            let b = &route.bounds;
            let lat_overlap = uk.min_lat <= b.max_lat && b.min_lat <= uk.max_lat;
            let lng_overlap = uk.min_lng <= b.max_lng && b.min_lng <= uk.max_lng;
            assert!(
                !(lat_overlap && lng_overlap),
                "UK box overlaps '{}'",
                route.name
            );
        }
    }

    #[test]
    fn test_box_edges_are_inclusive() {
        let uk = &ROUTING_TABLE[0].bounds;
        assert!(uk.contains(49.0, -11.0));
        assert!(uk.contains(61.0, 2.0));
        assert!(!uk.contains(48.999, 0.0));
    }
}
