use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::courier::Courier;
use crate::models::point::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/couriers", post(create_courier).get(list_couriers))
        .route("/couriers/:id/location", patch(update_courier_location))
        .route(
            "/couriers/:id/availability",
            patch(update_courier_availability),
        )
}

#[derive(Deserialize)]
pub struct CreateCourierRequest {
    pub name: String,
    pub current_position: Option<GeoPoint>,
    pub zone_id: Option<String>,
    pub max_deliveries_per_day: usize,
    pub max_distance_km: Option<f64>,
    pub average_speed_kmh: Option<f64>,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub position: GeoPoint,
}

#[derive(Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub available: bool,
}

async fn create_courier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCourierRequest>,
) -> Result<Json<Courier>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if payload.max_deliveries_per_day == 0 {
        return Err(AppError::BadRequest(
            "max_deliveries_per_day must be > 0".to_string(),
        ));
    }

    if let Some(position) = &payload.current_position {
        position.validate()?;
    }

    if payload.max_distance_km.is_some_and(|km| km <= 0.0) {
        return Err(AppError::BadRequest(
            "max_distance_km must be > 0".to_string(),
        ));
    }

    let courier = Courier {
        id: Uuid::new_v4(),
        name: payload.name,
        current_position: payload.current_position,
        zone_id: payload.zone_id,
        max_deliveries_per_day: payload.max_deliveries_per_day,
        max_distance_km: payload.max_distance_km,
        average_speed_kmh: payload.average_speed_kmh,
        available: true,
        updated_at: Utc::now(),
    };

    state.store.couriers.insert(courier.id, courier.clone());
    Ok(Json(courier))
}

async fn list_couriers(State(state): State<Arc<AppState>>) -> Json<Vec<Courier>> {
    let couriers = state
        .store
        .couriers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(couriers)
}

async fn update_courier_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Courier>, AppError> {
    payload.position.validate()?;

    let mut courier = state
        .store
        .couriers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("courier {} not found", id)))?;

    courier.current_position = Some(payload.position);
    courier.updated_at = Utc::now();

    Ok(Json(courier.clone()))
}

async fn update_courier_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Courier>, AppError> {
    let mut courier = state
        .store
        .couriers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("courier {} not found", id)))?;

    courier.available = payload.available;
    courier.updated_at = Utc::now();

    Ok(Json(courier.clone()))
}
