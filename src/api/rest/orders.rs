use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{OrderStatus, StoredOrder};
use crate::models::point::{GeoPoint, Priority};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub dropoff: Option<GeoPoint>,
    pub pickup: Option<GeoPoint>,
    pub address: String,
    pub customer_name: Option<String>,
    pub priority: Priority,
    pub scheduled_date: NaiveDate,
    pub estimated_stop_minutes: Option<u32>,
}

#[derive(Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<StoredOrder>, AppError> {
    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest("address cannot be empty".to_string()));
    }

    for position in payload.dropoff.iter().chain(payload.pickup.iter()) {
        position.validate()?;
    }

    let order = StoredOrder {
        id: Uuid::new_v4(),
        dropoff: payload.dropoff,
        pickup: payload.pickup,
        address: payload.address,
        customer_name: payload.customer_name,
        priority: payload.priority,
        status: OrderStatus::Pending,
        scheduled_date: payload.scheduled_date,
        estimated_stop_minutes: payload.estimated_stop_minutes,
        assigned_courier: None,
        sequence_number: None,
        estimated_distance_km: None,
        estimated_duration_minutes: None,
        estimated_arrival: None,
        created_at: Utc::now(),
    };

    state.store.orders.insert(order.id, order.clone());
    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<StoredOrder>> {
    let orders = state
        .store
        .orders
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(orders)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredOrder>, AppError> {
    let order = state
        .store
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order.value().clone()))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<StoredOrder>, AppError> {
    let mut order = state
        .store
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    // Routing an order that lost its coordinates makes no sense.
    if payload.status == OrderStatus::ReadyToRoute && order.dropoff.is_none() {
        return Err(AppError::BadRequest(
            "order has no dropoff coordinates".to_string(),
        ));
    }

    order.status = payload.status;
    Ok(Json(order.clone()))
}
