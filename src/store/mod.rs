use chrono::{Duration, NaiveDate, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{estimate_travel_time_minutes, haversine_km};
use crate::models::courier::Courier;
use crate::models::order::{OrderStatus, StoredOrder};
use crate::models::plan::{RoutePlan, RouteSummary};
use crate::models::point::DeliveryPoint;

/// What the planner needs from durable storage: candidates in, sequence
/// assignments out. Read-plan-write is best effort, not transactional;
/// concurrent plans for the same courier can race on write-back.
pub trait RoutePersistence: Send + Sync {
    fn fetch_plannable_orders(&self, zone_id: Option<&str>, date: NaiveDate)
        -> Vec<DeliveryPoint>;
    fn fetch_available_couriers(&self, zone_id: Option<&str>, date: NaiveDate) -> Vec<Courier>;
    fn persist_route_plan(&self, plan: &RoutePlan, date: NaiveDate) -> Result<Uuid, AppError>;
}

/// DashMap-backed store. Orders and couriers live here for the lifetime of
/// the process; route summaries accumulate per planning run.
#[derive(Default)]
pub struct InMemoryStore {
    pub couriers: DashMap<Uuid, Courier>,
    pub orders: DashMap<Uuid, StoredOrder>,
    pub routes: DashMap<Uuid, RouteSummary>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutePersistence for InMemoryStore {
    // Orders carry no zone of their own; zone scoping happens through the
    // ZoneLocator during assignment.
    fn fetch_plannable_orders(
        &self,
        _zone_id: Option<&str>,
        date: NaiveDate,
    ) -> Vec<DeliveryPoint> {
        self.orders
            .iter()
            .filter(|entry| entry.value().is_plannable(date))
            .filter_map(|entry| entry.value().to_delivery_point())
            .collect()
    }

    fn fetch_available_couriers(
        &self,
        zone_id: Option<&str>,
        _date: NaiveDate,
    ) -> Vec<Courier> {
        self.couriers
            .iter()
            .filter(|entry| {
                let courier = entry.value();
                courier.available
                    && (zone_id.is_none()
                        || courier.zone_id.is_none()
                        || courier.zone_id.as_deref() == zone_id)
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Writes the summary row and stamps each routed order with its courier,
    /// 1-based sequence number and leg estimates.
    fn persist_route_plan(&self, plan: &RoutePlan, date: NaiveDate) -> Result<Uuid, AppError> {
        let route_id = Uuid::new_v4();

        let courier = self
            .couriers
            .get(&plan.courier_id)
            .ok_or_else(|| AppError::NotFound(format!("courier {} not found", plan.courier_id)))?;
        let speed = courier.speed_kmh();
        let mut position = courier
            .current_position
            .ok_or(AppError::MissingCourierLocation)?;
        drop(courier);

        let mut elapsed_minutes: i64 = 0;
        for (idx, point) in plan.delivery_points.iter().enumerate() {
            let leg_km = haversine_km(&position, &point.position);
            let travel = estimate_travel_time_minutes(&position, &point.position, speed);
            elapsed_minutes += i64::from(travel);

            if let Some(mut order) = self.orders.get_mut(&point.id) {
                order.status = OrderStatus::Assigned;
                order.assigned_courier = Some(plan.courier_id);
                order.sequence_number = Some(idx as u32 + 1);
                order.estimated_distance_km = Some((leg_km * 100.0).round() / 100.0);
                order.estimated_duration_minutes = Some(travel + point.stop_minutes());
                order.estimated_arrival = Some(Utc::now() + Duration::minutes(elapsed_minutes));
            }

            elapsed_minutes += i64::from(point.stop_minutes());
            position = point.position;
        }

        let summary = RouteSummary {
            route_id,
            courier_id: plan.courier_id,
            zone_id: plan.zone_id.clone(),
            date,
            stop_count: plan.delivery_points.len(),
            total_distance_km: plan.total_distance_km,
            total_duration_minutes: plan.total_duration_minutes,
            created_at: Utc::now(),
        };
        self.routes.insert(route_id, summary);

        Ok(route_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::{InMemoryStore, RoutePersistence};
    use crate::engine::planner::plan_route;
    use crate::models::courier::Courier;
    use crate::models::order::{OrderStatus, StoredOrder};
    use crate::models::point::{GeoPoint, Priority};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    fn order(id_seed: u128, status: OrderStatus, lat: f64) -> StoredOrder {
        StoredOrder {
            id: Uuid::from_u128(id_seed),
            dropoff: Some(GeoPoint { lat, lng: 29.0 }),
            pickup: None,
            address: format!("stop-{id_seed}"),
            customer_name: None,
            priority: Priority::Medium,
            status,
            scheduled_date: date(),
            estimated_stop_minutes: None,
            assigned_courier: None,
            sequence_number: None,
            estimated_distance_km: None,
            estimated_duration_minutes: None,
            estimated_arrival: None,
            created_at: Utc::now(),
        }
    }

    fn courier() -> Courier {
        Courier {
            id: Uuid::from_u128(99),
            name: "store-courier".to_string(),
            current_position: Some(GeoPoint {
                lat: 41.0,
                lng: 29.0,
            }),
            zone_id: None,
            max_deliveries_per_day: 10,
            max_distance_km: None,
            average_speed_kmh: None,
            available: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_ready_orders_with_coordinates_are_plannable() {
        let store = InMemoryStore::new();
        store
            .orders
            .insert(Uuid::from_u128(1), order(1, OrderStatus::ReadyToRoute, 41.01));
        store
            .orders
            .insert(Uuid::from_u128(2), order(2, OrderStatus::Pending, 41.02));
        let mut no_coords = order(3, OrderStatus::ReadyToRoute, 41.03);
        no_coords.dropoff = None;
        store.orders.insert(Uuid::from_u128(3), no_coords);

        let plannable = store.fetch_plannable_orders(None, date());
        assert_eq!(plannable.len(), 1);
        assert_eq!(plannable[0].id, Uuid::from_u128(1));
    }

    #[test]
    fn persist_stamps_sequence_numbers_and_summary() {
        let store = InMemoryStore::new();
        let courier = courier();
        store.couriers.insert(courier.id, courier.clone());
        store
            .orders
            .insert(Uuid::from_u128(1), order(1, OrderStatus::ReadyToRoute, 41.01));
        store
            .orders
            .insert(Uuid::from_u128(2), order(2, OrderStatus::ReadyToRoute, 41.02));

        let points = store.fetch_plannable_orders(None, date());
        let outcome = plan_route(&courier, &points).unwrap();
        let route_id = store.persist_route_plan(&outcome.plan, date()).unwrap();

        let first = store.orders.get(&Uuid::from_u128(1)).unwrap();
        assert_eq!(first.status, OrderStatus::Assigned);
        assert_eq!(first.assigned_courier, Some(courier.id));
        assert_eq!(first.sequence_number, Some(1));
        assert!(first.estimated_duration_minutes.unwrap() >= 11);

        let second = store.orders.get(&Uuid::from_u128(2)).unwrap();
        assert_eq!(second.sequence_number, Some(2));

        let summary = store.routes.get(&route_id).unwrap();
        assert_eq!(summary.stop_count, 2);
        assert_eq!(summary.courier_id, courier.id);
    }

    #[test]
    fn unavailable_couriers_are_not_offered() {
        let store = InMemoryStore::new();
        let mut off_duty = courier();
        off_duty.available = false;
        store.couriers.insert(off_duty.id, off_duty);

        assert!(store.fetch_available_couriers(None, date()).is_empty());
    }
}
