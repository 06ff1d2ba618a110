use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::matcher::{self, DEFAULT_RADIUS_KM, MatchRequest, MatchedOffer};
use crate::models::offer::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/nearby-riders", post(nearby_riders))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRidersRequest {
    pub user_location: GeoPoint,
    pub user_drop_location: GeoPoint,
    #[serde(default = "default_radius")]
    pub radius: f64,
    // Accepted for API compatibility; matching only checks the offer's own
    // date against the grace window.
    pub user_journey_date: Option<String>,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_KM
}

#[derive(Serialize)]
pub struct NearbyRidersResponse {
    pub riders: Vec<NearbyRider>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRider {
    pub id: Uuid,
    pub name: String,
    pub picture: Option<String>,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub drop_lat: f64,
    pub drop_lng: f64,
    pub pickup: String,
    pub drop: String,
    pub car_model: Option<String>,
    pub seats: Option<u8>,
    #[serde(rename = "carnumber")]
    pub car_number: Option<String>,
    pub price: Option<String>,
    pub email: String,
    pub journey_date: Option<DateTime<Utc>>,
}

impl From<MatchedOffer> for NearbyRider {
    fn from(matched: MatchedOffer) -> Self {
        let offer = matched.offer;
        Self {
            id: offer.id,
            name: offer.name,
            picture: offer.picture,
            pickup_lat: matched.pickup_point.lat,
            pickup_lng: matched.pickup_point.lng,
            drop_lat: matched.drop_point.lat,
            drop_lng: matched.drop_point.lng,
            pickup: offer.pickup.unwrap_or_default(),
            drop: offer.drop.unwrap_or_default(),
            car_model: offer.car_model,
            seats: offer.seats,
            car_number: offer.car_number,
            price: offer.price,
            email: offer.email,
            journey_date: offer.journey_date,
        }
    }
}

async fn nearby_riders(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NearbyRidersRequest>,
) -> Result<Json<NearbyRidersResponse>, AppError> {
    if !payload.user_location.in_bounds() || !payload.user_drop_location.in_bounds() {
        return Err(AppError::BadRequest(
            "location coordinates out of bounds".to_string(),
        ));
    }

    if !payload.radius.is_finite() || payload.radius <= 0.0 {
        return Err(AppError::BadRequest(
            "radius must be a positive number of kilometers".to_string(),
        ));
    }

    if let Some(date) = &payload.user_journey_date {
        debug!(user_journey_date = %date, "requester journey date not used for matching");
    }

    let request = MatchRequest {
        pickup: payload.user_location,
        drop: payload.user_drop_location,
        radius_km: payload.radius,
    };
    let catalog = state.catalog();

    let start = Instant::now();
    let matched = matcher::find_nearby(
        &state.geocoder,
        &request,
        catalog,
        state.geocode_concurrency,
    )
    .await;

    let elapsed = start.elapsed().as_secs_f64();
    state
        .metrics
        .match_latency_seconds
        .with_label_values(&["success"])
        .observe(elapsed);
    state
        .metrics
        .match_requests_total
        .with_label_values(&["success"])
        .inc();

    info!(
        matched = matched.len(),
        radius_km = request.radius_km,
        "nearby riders computed"
    );

    Ok(Json(NearbyRidersResponse {
        riders: matched.into_iter().map(NearbyRider::from).collect(),
    }))
}
