use std::future::Future;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::offer::GeoPoint;
use crate::observability::metrics::Metrics;

/// Resolves a free-text place name to a coordinate. `None` covers both "no
/// candidates" and "lookup failed"; callers treat it as a data-quality skip.
pub trait PlaceResolver {
    fn resolve(&self, place: &str) -> impl Future<Output = Option<GeoPoint>> + Send;
}

/// Nominatim-style geocoding client. The first candidate returned by the
/// lookup service is taken as authoritative; resolved points are memoized
/// with a TTL so repeated place names across offers do not re-hit the
/// service.
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
    cache: DashMap<String, CachedPoint>,
    cache_ttl: Duration,
    metrics: Metrics,
}

#[derive(Clone, Copy)]
struct CachedPoint {
    point: GeoPoint,
    resolved_at: Instant,
}

#[derive(Debug, Deserialize)]
struct PlaceCandidate {
    lat: String,
    lon: String,
}

impl Geocoder {
    pub fn new(config: &Config, metrics: Metrics) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(config.geocoder_user_agent.clone())
            .timeout(Duration::from_millis(config.geocoder_timeout_ms))
            .build()
            .map_err(|err| AppError::Internal(format!("failed to build geocoder client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.geocoder_url.trim_end_matches('/').to_string(),
            cache: DashMap::new(),
            cache_ttl: Duration::from_secs(config.geocode_cache_ttl_secs),
            metrics,
        })
    }

    fn cached(&self, place: &str) -> Option<GeoPoint> {
        let entry = self.cache.get(place)?;
        if entry.resolved_at.elapsed() < self.cache_ttl {
            Some(entry.point)
        } else {
            None
        }
    }

    async fn lookup(&self, place: &str) -> Result<Option<GeoPoint>, reqwest::Error> {
        let candidates: Vec<PlaceCandidate> = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(first_candidate(&candidates))
    }
}

impl PlaceResolver for Geocoder {
    async fn resolve(&self, place: &str) -> Option<GeoPoint> {
        if let Some(point) = self.cached(place) {
            self.metrics
                .geocode_lookups_total
                .with_label_values(&["cache_hit"])
                .inc();
            return Some(point);
        }

        match self.lookup(place).await {
            Ok(Some(point)) => {
                self.cache.insert(
                    place.to_string(),
                    CachedPoint {
                        point,
                        resolved_at: Instant::now(),
                    },
                );
                self.metrics
                    .geocode_lookups_total
                    .with_label_values(&["resolved"])
                    .inc();
                Some(point)
            }
            Ok(None) => {
                debug!(place, "no geocoding candidates");
                self.metrics
                    .geocode_lookups_total
                    .with_label_values(&["not_found"])
                    .inc();
                None
            }
            Err(err) => {
                warn!(place, error = %err, "geocoding lookup failed");
                self.metrics
                    .geocode_lookups_total
                    .with_label_values(&["error"])
                    .inc();
                None
            }
        }
    }
}

fn first_candidate(candidates: &[PlaceCandidate]) -> Option<GeoPoint> {
    let first = candidates.first()?;
    let lat = first.lat.parse().ok()?;
    let lng = first.lon.parse().ok()?;
    Some(GeoPoint { lat, lng })
}
