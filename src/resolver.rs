//! Tide resolution: regional routing, provider fallback, enrichment merge.
//!
//! The resolver is a decision tree, not a long-lived state machine. For
//! each query it walks the regional routing table in priority order,
//! attempts the matching provider tier, and short-circuits on the first
//! success; the global forecast provider is the unconditional tail of the
//! chain. Every tier is isolated — a failing provider yields `None` from
//! its adapter and the walk simply continues — so an exhausted chain
//! surfaces as `None`, which callers must treat as "no coverage here",
//! never as an error.

use chrono::{DateTime, NaiveDate, Utc};

use crate::analysis::interpolate;
use crate::config::ServiceConfig;
use crate::ingest::coops::CoopsProvider;
use crate::ingest::ea::EaGaugeProvider;
use crate::ingest::worldtides::WorldTidesProvider;
use crate::ingest::{ForecastProvider, TideProvider};
use crate::model::{TideData, TidePrediction, TideSource};
use crate::regions;

/// What happened to the best-effort forecast enrichment of a gauge result.
///
/// Carried alongside the result instead of being a silently logged
/// failure: a gauge-only result and an enriched one are observably
/// different things.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Forecast fetched; forward-looking fields were overwritten.
    Applied,
    /// Forecast configured but not usable right now; gauge-derived
    /// (historical, possibly stale) predictions were kept.
    Unavailable,
    /// No global provider configured; nothing was attempted.
    NotConfigured,
}

/// The resolution engine. Generic over its providers so the fallback
/// behavior is testable with stubs; production code uses [`TideResolver::new`]
/// and never names the type parameters.
pub struct TideResolver<G = EaGaugeProvider, N = CoopsProvider, W = WorldTidesProvider> {
    gauge: G,
    national: N,
    global: Option<W>,
}

impl TideResolver {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            gauge: EaGaugeProvider::new(config),
            national: CoopsProvider::new(config),
            global: WorldTidesProvider::new(config),
        }
    }
}

impl<G, N, W> TideResolver<G, N, W>
where
    G: TideProvider,
    N: TideProvider,
    W: ForecastProvider,
{
    /// Assembles a resolver from explicit providers. `global: None` means
    /// the commercial forecast is unconfigured.
    pub fn with_providers(gauge: G, national: N, global: Option<W>) -> Self {
        Self { gauge, national, global }
    }

    /// Resolves current tide state and upcoming events for a coordinate.
    ///
    /// `None` is the ordinary "no coverage at this location" outcome.
    pub fn get_tide_data(&self, latitude: f64, longitude: f64) -> Option<TideData> {
        let now = Utc::now();

        for route in regions::routes_for(latitude, longitude) {
            let attempt = match route.source {
                TideSource::Gauge => self.resolve_gauge_tier(latitude, longitude, now),
                TideSource::National => self.national.fetch(latitude, longitude),
                TideSource::Global => self
                    .global
                    .as_ref()
                    .and_then(|g| g.fetch(latitude, longitude)),
            };
            if attempt.is_some() {
                return attempt;
            }
        }

        // Tail of the chain: anywhere not covered above, and any regional
        // tier that came up empty.
        self.global
            .as_ref()
            .and_then(|global| global.fetch(latitude, longitude))
    }

    /// Forward-looking query for an arbitrary date window. Only the
    /// global provider is date-addressable; without one this is `None`
    /// immediately — the other providers are not consulted.
    pub fn get_tide_data_for_date(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        days: u32,
    ) -> Option<TideData> {
        self.global
            .as_ref()?
            .fetch_window(latitude, longitude, date, days)
    }

    /// The gauge tier: live reading plus locally derived turning points,
    /// then a best-effort forecast enrichment. The gauge cannot forecast,
    /// so a successful enrichment replaces only the forward-looking
    /// fields; enrichment failure is non-fatal by design.
    fn resolve_gauge_tier(
        &self,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> Option<TideData> {
        let base = self.gauge.fetch(latitude, longitude)?;
        let (data, outcome) = self.enrich_gauge_result(base, latitude, longitude, now);
        if outcome == EnrichmentOutcome::Unavailable {
            eprintln!("forecast enrichment unavailable; keeping gauge-derived predictions");
        }
        Some(data)
    }

    /// attempt(primary) → attempt(optional enrichment) → merge-or-keep.
    fn enrich_gauge_result(
        &self,
        base: TideData,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> (TideData, EnrichmentOutcome) {
        let Some(global) = self.global.as_ref() else {
            return (base, EnrichmentOutcome::NotConfigured);
        };

        let Some(forecast) = global.fetch(latitude, longitude) else {
            return (base, EnrichmentOutcome::Unavailable);
        };

        let future: Vec<TidePrediction> = forecast
            .predictions
            .into_iter()
            .filter(|p| p.time > now)
            .collect();
        if future.is_empty() {
            return (base, EnrichmentOutcome::Unavailable);
        }

        (merge_forecast(base, future, now), EnrichmentOutcome::Applied)
    }
}

/// Overwrites a gauge result's forward-looking fields with forecast
/// predictions (already filtered to the future). The live gauge reading
/// stays authoritative for `current`; only `next_tide` inside it is
/// refreshed, since the forecast knows the future and the gauge does not.
pub fn merge_forecast(
    base: TideData,
    future_predictions: Vec<TidePrediction>,
    now: DateTime<Utc>,
) -> TideData {
    let mut data = base;
    data.extremes = interpolate::upcoming_extremes(&future_predictions, now);
    data.predictions = future_predictions;
    if let Some(current) = data.current.as_mut() {
        current.next_tide = data.predictions.first().cloned();
    }
    data
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
