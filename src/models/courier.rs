use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::point::GeoPoint;

/// Courier speed assumed when none is configured.
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
    pub id: Uuid,
    pub name: String,
    /// Planning fails without a known position; callers supply a fallback
    /// before asking for a route, never the planner itself.
    pub current_position: Option<GeoPoint>,
    pub zone_id: Option<String>,
    pub max_deliveries_per_day: usize,
    /// Per-leg cap in km; legs beyond it are excluded from the route.
    pub max_distance_km: Option<f64>,
    pub average_speed_kmh: Option<f64>,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}

impl Courier {
    pub fn speed_kmh(&self) -> f64 {
        self.average_speed_kmh.unwrap_or(DEFAULT_SPEED_KMH)
    }
}
