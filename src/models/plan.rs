use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::point::{DeliveryPoint, GeoPoint};

/// The visiting order for one courier. `delivery_points` *is* the route;
/// index order is the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    pub courier_id: Uuid,
    pub zone_id: Option<String>,
    pub delivery_points: Vec<DeliveryPoint>,
    /// Kilometers over consecutive great-circle legs, 2-decimal precision.
    pub total_distance_km: f64,
    /// Travel time (per-leg ceiling) plus per-stop handling minutes.
    pub total_duration_minutes: u32,
}

impl RoutePlan {
    pub fn empty(courier_id: Uuid, zone_id: Option<String>) -> Self {
        Self {
            courier_id,
            zone_id,
            delivery_points: Vec::new(),
            total_distance_km: 0.0,
            total_duration_minutes: 0,
        }
    }
}

/// A plan plus the points it could not take. Callers no longer have to diff
/// input against output to find what was dropped by the capacity or
/// max-distance policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub plan: RoutePlan,
    pub excluded: Vec<DeliveryPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointKind {
    CurrentLocation,
    Pickup,
    Dropoff,
}

/// One rendered map stop in the detailed route view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub kind: WaypointKind,
    pub position: GeoPoint,
    pub label: String,
    pub point_id: Option<Uuid>,
}

/// Display-oriented expansion of a plan: current location first, then
/// pickup/dropoff pairs in visiting order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedRoute {
    pub plan: RoutePlan,
    pub waypoints: Vec<Waypoint>,
    pub excluded: Vec<DeliveryPoint>,
}

/// Persisted summary row written once per planned route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route_id: Uuid,
    pub courier_id: Uuid,
    pub zone_id: Option<String>,
    pub date: NaiveDate,
    pub stop_count: usize,
    pub total_distance_km: f64,
    pub total_duration_minutes: u32,
    pub created_at: DateTime<Utc>,
}
