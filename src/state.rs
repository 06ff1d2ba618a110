use dashmap::DashMap;
use uuid::Uuid;

use crate::geocode::Geocoder;
use crate::models::offer::RideOffer;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub riders: DashMap<Uuid, RideOffer>,
    pub geocoder: Geocoder,
    pub geocode_concurrency: usize,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(geocoder: Geocoder, metrics: Metrics, geocode_concurrency: usize) -> Self {
        Self {
            riders: DashMap::new(),
            geocoder,
            geocode_concurrency: geocode_concurrency.max(1),
            metrics,
        }
    }

    /// Snapshot of the catalog in registration order; the matcher never
    /// mutates offers.
    pub fn catalog(&self) -> Vec<RideOffer> {
        let mut offers: Vec<RideOffer> = self
            .riders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        offers.sort_by_key(|offer| (offer.created_at, offer.id));
        offers
    }
}
