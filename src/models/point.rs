use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Plain lat/lng in degrees. No datum correction is applied anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(AppError::InvalidArgument(format!(
                "latitude {} out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(AppError::InvalidArgument(format!(
                "longitude {} out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Numeric tier used for the priority-descending sort: Urgent=3 .. Low=0.
    pub fn tier(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }

    /// Urgent and High are routed in priority order, ahead of any
    /// nearest-neighbor optimization.
    pub fn is_high_tier(&self) -> bool {
        self.tier() >= 2
    }
}

/// One stop the planner may visit. Built fresh from stored orders per
/// planning call; the planner never mutates these, it returns ordered copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPoint {
    pub id: Uuid,
    pub position: GeoPoint,
    /// Business/pickup location, rendered by the detailed-waypoint variant.
    pub pickup: Option<GeoPoint>,
    pub address: String,
    pub customer_name: Option<String>,
    pub priority: Priority,
    /// Minutes spent at the stop itself (handover time).
    pub estimated_duration_minutes: Option<u32>,
    pub status: String,
    pub estimated_arrival: Option<DateTime<Utc>>,
}

/// Stop handling time assumed when an order carries no estimate.
pub const DEFAULT_STOP_MINUTES: u32 = 10;

impl DeliveryPoint {
    pub fn stop_minutes(&self) -> u32 {
        self.estimated_duration_minutes
            .unwrap_or(DEFAULT_STOP_MINUTES)
    }
}
