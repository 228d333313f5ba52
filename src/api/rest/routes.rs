use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::planner::{plan_route, plan_route_with_waypoints};
use crate::engine::queue::enqueue_dispatch;
use crate::error::AppError;
use crate::models::courier::Courier;
use crate::models::plan::{DetailedRoute, PlanOutcome, RouteSummary};
use crate::models::point::DeliveryPoint;
use crate::state::{AppState, DispatchRequest};
use crate::store::RoutePersistence;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/routes/plan", post(plan_courier_route))
        .route("/routes/plan/detailed", post(plan_courier_route_detailed))
        .route("/routes", get(list_routes))
        .route("/dispatch", post(request_dispatch))
}

#[derive(Deserialize)]
pub struct PlanRequest {
    pub courier_id: Uuid,
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct DispatchRequestBody {
    pub zone_id: Option<String>,
    pub date: Option<NaiveDate>,
}

/// The shape the UI map/list components consume.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub courier: Courier,
    pub delivery_points: Vec<RoutedStopResponse>,
    pub total_distance: f64,
    pub total_duration: u32,
    pub excluded: Vec<DeliveryPoint>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedStopResponse {
    pub id: Uuid,
    pub sequence_number: u32,
    pub status: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub estimated_arrival: Option<DateTime<Utc>>,
}

fn to_plan_response(courier: Courier, outcome: PlanOutcome) -> PlanResponse {
    let delivery_points = outcome
        .plan
        .delivery_points
        .iter()
        .enumerate()
        .map(|(idx, point)| RoutedStopResponse {
            id: point.id,
            sequence_number: idx as u32 + 1,
            status: point.status.clone(),
            address: point.address.clone(),
            lat: point.position.lat,
            lng: point.position.lng,
            estimated_arrival: point.estimated_arrival,
        })
        .collect();

    PlanResponse {
        courier,
        delivery_points,
        total_distance: outcome.plan.total_distance_km,
        total_duration: outcome.plan.total_duration_minutes,
        excluded: outcome.excluded,
    }
}

fn load_courier(state: &AppState, id: Uuid) -> Result<Courier, AppError> {
    state
        .store
        .couriers
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("courier {} not found", id)))
}

async fn plan_courier_route(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let courier = load_courier(&state, payload.courier_id)?;
    let date = payload.date.unwrap_or_else(|| Utc::now().date_naive());

    let points = state.store.fetch_plannable_orders(None, date);
    let outcome = plan_route(&courier, &points)?;

    if !outcome.plan.delivery_points.is_empty() {
        state.store.persist_route_plan(&outcome.plan, date)?;
    }

    Ok(Json(to_plan_response(courier, outcome)))
}

async fn plan_courier_route_detailed(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlanRequest>,
) -> Result<Json<DetailedRoute>, AppError> {
    let courier = load_courier(&state, payload.courier_id)?;
    let date = payload.date.unwrap_or_else(|| Utc::now().date_naive());

    let points = state.store.fetch_plannable_orders(None, date);
    let detailed = plan_route_with_waypoints(&courier, &points)?;

    Ok(Json(detailed))
}

async fn list_routes(State(state): State<Arc<AppState>>) -> Json<Vec<RouteSummary>> {
    let routes = state
        .store
        .routes
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(routes)
}

async fn request_dispatch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DispatchRequestBody>,
) -> Result<StatusCode, AppError> {
    let request = DispatchRequest {
        zone_id: payload.zone_id,
        date: payload.date.unwrap_or_else(|| Utc::now().date_naive()),
    };

    enqueue_dispatch(&state, request).await?;
    Ok(StatusCode::ACCEPTED)
}
