use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::geo::haversine_km;
use crate::geocode::PlaceResolver;
use crate::models::offer::{GeoPoint, RideOffer};

/// Rides stay matchable until this long past their stated start.
const GRACE_WINDOW_HOURS: i64 = 6;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;

#[derive(Debug, Clone, Copy)]
pub struct MatchRequest {
    pub pickup: GeoPoint,
    pub drop: GeoPoint,
    pub radius_km: f64,
}

#[derive(Debug, Clone)]
pub struct MatchedOffer {
    pub offer: RideOffer,
    pub pickup_point: GeoPoint,
    pub drop_point: GeoPoint,
}

/// Filters the catalog down to offers whose resolved pickup and drop points
/// both lie within `radius_km` of the requester's points. Offers are
/// evaluated through an ordered buffered stream, so lookups overlap up to
/// `concurrency` while the result keeps the catalog scan order. Offers that
/// fail eligibility or geocoding are skipped, never errors.
pub async fn find_nearby<R>(
    resolver: &R,
    request: &MatchRequest,
    catalog: Vec<RideOffer>,
    concurrency: usize,
) -> Vec<MatchedOffer>
where
    R: PlaceResolver + Sync,
{
    let now = Utc::now();
    let eligible: Vec<RideOffer> = catalog
        .into_iter()
        .filter(|offer| {
            let keep = is_eligible(offer, now);
            if !keep {
                debug!(rider = %offer.name, "skipping ineligible or past ride");
            }
            keep
        })
        .collect();

    let evaluated: Vec<Option<MatchedOffer>> = stream::iter(eligible)
        .map(|offer| evaluate_offer(resolver, request, offer))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    evaluated.into_iter().flatten().collect()
}

fn is_eligible(offer: &RideOffer, now: DateTime<Utc>) -> bool {
    let has_route = offer
        .pickup
        .as_deref()
        .is_some_and(|place| !place.trim().is_empty())
        && offer
            .drop
            .as_deref()
            .is_some_and(|place| !place.trim().is_empty());

    let Some(journey_date) = offer.journey_date else {
        return false;
    };

    has_route && journey_date + Duration::hours(GRACE_WINDOW_HOURS) >= now
}

async fn evaluate_offer<R>(
    resolver: &R,
    request: &MatchRequest,
    offer: RideOffer,
) -> Option<MatchedOffer>
where
    R: PlaceResolver + Sync,
{
    let pickup_place = offer.pickup.clone()?;
    let drop_place = offer.drop.clone()?;

    let (pickup_point, drop_point) = tokio::join!(
        resolver.resolve(&pickup_place),
        resolver.resolve(&drop_place)
    );
    let pickup_point = pickup_point?;
    let drop_point = drop_point?;

    let pickup_distance = haversine_km(&request.pickup, &pickup_point);
    let drop_distance = haversine_km(&request.drop, &drop_point);

    debug!(
        rider = %offer.name,
        pickup_km = pickup_distance,
        drop_km = drop_distance,
        "evaluated offer"
    );

    if pickup_distance <= request.radius_km && drop_distance <= request.radius_km {
        Some(MatchedOffer {
            offer,
            pickup_point,
            drop_point,
        })
    } else {
        None
    }
}
