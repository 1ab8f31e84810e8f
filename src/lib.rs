//! tidecast: tide-data resolution engine.
//!
//! Given a WGS84 coordinate, produces one coherent estimate of current
//! tide height/trend and upcoming high/low events by reconciling three
//! regionally-scoped upstream sources of differing capability: a
//! real-time gauge network with no forecasting (UK Environment Agency),
//! a national forecast API with a fixed station catalog (NOAA CO-OPS),
//! and a global commercial forecast API (WorldTides).
//!
//! # Module structure
//!
//! ```text
//! tidecast
//! ├── model      — shared data types (TideStation, TidePrediction, TideData, TideError, …)
//! ├── config     — service configuration (tidecast.toml + WORLDTIDES_API_KEY)
//! ├── geo        — haversine distance + catalog-agnostic nearest-station search
//! ├── regions    — ordered (bounding box → source) routing table
//! ├── stations   — curated CO-OPS tide station registry
//! ├── ingest
//! │   ├── ea         — Environment Agency tide gauges: discovery, cached catalog,
//! │   │                concurrent latest+history readings
//! │   ├── coops      — NOAA CO-OPS high/low predictions
//! │   ├── worldtides — WorldTides v3 extremes (API-key gated, date-addressable)
//! │   └── fixtures (test only) — representative API response payloads
//! ├── analysis
//! │   ├── extrema     — turning-point detection over raw gauge readings
//! │   └── interpolate — raised-cosine current-state estimation
//! └── resolver   — regional fallback chain + enrichment merge; the entry points
//!                  `get_tide_data` and `get_tide_data_for_date`
//! ```

pub mod analysis;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod model;
pub mod regions;
pub mod resolver;
pub mod stations;
