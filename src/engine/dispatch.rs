use std::collections::HashMap;

use uuid::Uuid;

use crate::engine::zones::ZoneLocator;
use crate::models::courier::Courier;
use crate::models::point::DeliveryPoint;

/// Per-courier buckets plus everything nobody could take. A point ends up in
/// `unassigned` when its zone has no eligible courier or when every eligible
/// courier was already at capacity on its round-robin turn.
#[derive(Debug, Clone, Default)]
pub struct AssignmentOutcome {
    pub assignments: HashMap<Uuid, Vec<DeliveryPoint>>,
    pub unassigned: Vec<DeliveryPoint>,
}

/// Spreads delivery points across couriers zone by zone.
///
/// This is a coarse load-spreading heuristic, not a least-cost assignment:
/// points are grouped by located zone and round-robined over the couriers
/// eligible for that zone (`point[i] -> courier[i mod N]`). A courier at
/// `max_deliveries_per_day` has its turn skipped; the point is not re-queued
/// to a different courier, it goes to `unassigned`.
pub fn assign_deliveries(
    couriers: &[Courier],
    points: &[DeliveryPoint],
    zones: &dyn ZoneLocator,
) -> AssignmentOutcome {
    let mut outcome = AssignmentOutcome::default();

    // Stable grouping: zones appear in first-seen order, points keep input
    // order within their group.
    let mut zone_order: Vec<Option<String>> = Vec::new();
    let mut groups: HashMap<Option<String>, Vec<DeliveryPoint>> = HashMap::new();
    for point in points {
        let zone = zones.locate_zone(&point.position);
        if !groups.contains_key(&zone) {
            zone_order.push(zone.clone());
        }
        groups.entry(zone).or_default().push(point.clone());
    }

    for zone in zone_order {
        let group = match groups.remove(&zone) {
            Some(group) => group,
            None => continue,
        };

        // Couriers with no affiliation serve any zone.
        let eligible: Vec<&Courier> = couriers
            .iter()
            .filter(|courier| courier.zone_id.is_none() || courier.zone_id == zone)
            .collect();

        if eligible.is_empty() {
            outcome.unassigned.extend(group);
            continue;
        }

        for (idx, point) in group.into_iter().enumerate() {
            let courier = eligible[idx % eligible.len()];
            let bucket = outcome.assignments.entry(courier.id).or_default();

            if bucket.len() < courier.max_deliveries_per_day {
                bucket.push(point);
            } else {
                outcome.unassigned.push(point);
            }
        }
    }

    outcome
        .assignments
        .retain(|_, bucket| !bucket.is_empty());
    outcome
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::assign_deliveries;
    use crate::engine::zones::{NoopZoneLocator, ZoneLocator};
    use crate::models::courier::Courier;
    use crate::models::point::{DeliveryPoint, GeoPoint, Priority};

    fn courier(id_seed: u128, zone_id: Option<&str>, capacity: usize) -> Courier {
        Courier {
            id: Uuid::from_u128(id_seed),
            name: format!("courier-{id_seed}"),
            current_position: Some(GeoPoint {
                lat: 41.0,
                lng: 29.0,
            }),
            zone_id: zone_id.map(str::to_string),
            max_deliveries_per_day: capacity,
            max_distance_km: None,
            average_speed_kmh: None,
            available: true,
            updated_at: Utc::now(),
        }
    }

    fn point(id_seed: u128, lat: f64) -> DeliveryPoint {
        DeliveryPoint {
            id: Uuid::from_u128(id_seed),
            position: GeoPoint { lat, lng: 29.0 },
            pickup: None,
            address: format!("stop-{id_seed}"),
            customer_name: None,
            priority: Priority::Medium,
            estimated_duration_minutes: None,
            status: "ReadyToRoute".to_string(),
            estimated_arrival: None,
        }
    }

    struct NorthSouth;

    impl ZoneLocator for NorthSouth {
        fn locate_zone(&self, position: &GeoPoint) -> Option<String> {
            if position.lat >= 41.0 {
                Some("north".to_string())
            } else {
                Some("south".to_string())
            }
        }
    }

    #[test]
    fn round_robin_alternates_between_couriers() {
        let couriers = vec![courier(1, None, 10), courier(2, None, 10)];
        let points: Vec<_> = (1..=4).map(|i| point(i, 41.0)).collect();

        let outcome = assign_deliveries(&couriers, &points, &NoopZoneLocator);

        let first = &outcome.assignments[&Uuid::from_u128(1)];
        let second = &outcome.assignments[&Uuid::from_u128(2)];
        assert_eq!(
            first.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![Uuid::from_u128(1), Uuid::from_u128(3)]
        );
        assert_eq!(
            second.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![Uuid::from_u128(2), Uuid::from_u128(4)]
        );
        assert!(outcome.unassigned.is_empty());
    }

    #[test]
    fn no_bucket_exceeds_daily_capacity() {
        let couriers = vec![courier(1, None, 2), courier(2, None, 1)];
        let points: Vec<_> = (1..=6).map(|i| point(i, 41.0)).collect();

        let outcome = assign_deliveries(&couriers, &points, &NoopZoneLocator);

        for courier in &couriers {
            if let Some(bucket) = outcome.assignments.get(&courier.id) {
                assert!(bucket.len() <= courier.max_deliveries_per_day);
            }
        }
        // 6 points, combined capacity 3; the overflow is reported.
        assert_eq!(outcome.unassigned.len(), 3);
    }

    #[test]
    fn full_courier_turn_is_skipped_not_requeued() {
        let couriers = vec![courier(1, None, 1), courier(2, None, 10)];
        let points: Vec<_> = (1..=4).map(|i| point(i, 41.0)).collect();

        let outcome = assign_deliveries(&couriers, &points, &NoopZoneLocator);

        // Courier 1 takes point 1 and then loses its turn for point 3; the
        // point is not handed to courier 2.
        assert_eq!(outcome.assignments[&Uuid::from_u128(1)].len(), 1);
        assert_eq!(
            outcome.assignments[&Uuid::from_u128(2)]
                .iter()
                .map(|p| p.id)
                .collect::<Vec<_>>(),
            vec![Uuid::from_u128(2), Uuid::from_u128(4)]
        );
        assert_eq!(outcome.unassigned[0].id, Uuid::from_u128(3));
    }

    #[test]
    fn zone_affiliation_scopes_eligibility() {
        let couriers = vec![courier(1, Some("north"), 10), courier(2, Some("south"), 10)];
        let north_point = point(1, 41.5);
        let south_point = point(2, 40.5);

        let outcome =
            assign_deliveries(&couriers, &[north_point, south_point], &NorthSouth);

        assert_eq!(outcome.assignments[&Uuid::from_u128(1)][0].id, Uuid::from_u128(1));
        assert_eq!(outcome.assignments[&Uuid::from_u128(2)][0].id, Uuid::from_u128(2));
    }

    #[test]
    fn zone_without_eligible_courier_reports_points_unassigned() {
        let couriers = vec![courier(1, Some("north"), 10)];
        let south_point = point(1, 40.5);

        let outcome = assign_deliveries(&couriers, &[south_point], &NorthSouth);

        assert!(outcome.assignments.is_empty());
        assert_eq!(outcome.unassigned.len(), 1);
    }
}
