use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::offer::RideOffer;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/riders", post(create_rider).get(list_riders))
        .route("/riders/:id", get(get_rider))
        .route("/riders/:id/ride", patch(update_ride))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRiderRequest {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRideRequest {
    pub pickup: Option<String>,
    pub drop: Option<String>,
    pub journey_date: Option<DateTime<Utc>>,
    pub car_model: Option<String>,
    pub seats: Option<u8>,
    pub car_number: Option<String>,
    pub price: Option<String>,
}

async fn create_rider(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRiderRequest>,
) -> Result<Json<RideOffer>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("email cannot be empty".to_string()));
    }

    let now = Utc::now();
    let rider = RideOffer {
        id: Uuid::new_v4(),
        name: payload.name,
        email: payload.email,
        picture: payload.picture,
        pickup: None,
        drop: None,
        journey_date: None,
        car_model: None,
        seats: None,
        car_number: None,
        price: None,
        created_at: now,
        updated_at: now,
    };

    state.riders.insert(rider.id, rider.clone());
    state.metrics.riders_registered.inc();

    Ok(Json(rider))
}

async fn list_riders(State(state): State<Arc<AppState>>) -> Json<Vec<RideOffer>> {
    Json(state.catalog())
}

async fn get_rider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideOffer>, AppError> {
    let rider = state
        .riders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("rider {} not found", id)))?;

    Ok(Json(rider.value().clone()))
}

// Partial update of the published journey: only provided fields change.
async fn update_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRideRequest>,
) -> Result<Json<RideOffer>, AppError> {
    let mut rider = state
        .riders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("rider {} not found", id)))?;

    if let Some(pickup) = payload.pickup {
        rider.pickup = Some(pickup);
    }
    if let Some(drop) = payload.drop {
        rider.drop = Some(drop);
    }
    if let Some(journey_date) = payload.journey_date {
        rider.journey_date = Some(journey_date);
    }
    if let Some(car_model) = payload.car_model {
        rider.car_model = Some(car_model);
    }
    if let Some(seats) = payload.seats {
        rider.seats = Some(seats);
    }
    if let Some(car_number) = payload.car_number {
        rider.car_number = Some(car_number);
    }
    if let Some(price) = payload.price {
        rider.price = Some(price);
    }
    rider.updated_at = Utc::now();

    Ok(Json(rider.clone()))
}
