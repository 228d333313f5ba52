use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::point::{DeliveryPoint, GeoPoint, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    ReadyToRoute,
    Assigned,
    InTransit,
    Delivered,
    Cancelled,
}

/// The persisted order row. The planner never sees this type directly; the
/// store projects rows with coordinates into `DeliveryPoint`s and writes the
/// resulting sequence assignments back here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOrder {
    pub id: Uuid,
    pub dropoff: Option<GeoPoint>,
    pub pickup: Option<GeoPoint>,
    pub address: String,
    pub customer_name: Option<String>,
    pub priority: Priority,
    pub status: OrderStatus,
    pub scheduled_date: NaiveDate,
    pub estimated_stop_minutes: Option<u32>,
    // Write-back fields, stamped by persist_route_plan.
    pub assigned_courier: Option<Uuid>,
    pub sequence_number: Option<u32>,
    pub estimated_distance_km: Option<f64>,
    pub estimated_duration_minutes: Option<u32>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StoredOrder {
    /// Orders the planner may consider: ready, on the date, with coordinates.
    pub fn is_plannable(&self, date: NaiveDate) -> bool {
        self.status == OrderStatus::ReadyToRoute
            && self.scheduled_date == date
            && self.dropoff.is_some()
    }

    pub fn to_delivery_point(&self) -> Option<DeliveryPoint> {
        let position = self.dropoff?;
        Some(DeliveryPoint {
            id: self.id,
            position,
            pickup: self.pickup,
            address: self.address.clone(),
            customer_name: self.customer_name.clone(),
            priority: self.priority,
            estimated_duration_minutes: self.estimated_stop_minutes,
            status: format!("{:?}", self.status),
            estimated_arrival: self.estimated_arrival,
        })
    }
}
