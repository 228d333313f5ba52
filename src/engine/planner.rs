use crate::error::AppError;
use crate::geo::{estimate_travel_time_minutes, haversine_km};
use crate::models::courier::Courier;
use crate::models::plan::{DetailedRoute, PlanOutcome, RoutePlan, Waypoint, WaypointKind};
use crate::models::point::{DeliveryPoint, GeoPoint};

/// Builds the visiting order for one courier.
///
/// Two phases: Urgent/High points are taken in priority order first, then
/// the remaining capacity is filled with Medium/Low points by
/// nearest-neighbor from the rolling position. Fixing priority order for the
/// top tiers bounds how long an urgent order can be deferred by geography;
/// a single nearest-neighbor pass over everything could starve a distant
/// urgent stop indefinitely.
///
/// Points dropped by the per-leg `max_distance_km` cap or by the daily
/// capacity bound are returned in `excluded`, never silently discarded.
pub fn plan_route(courier: &Courier, points: &[DeliveryPoint]) -> Result<PlanOutcome, AppError> {
    let start = courier
        .current_position
        .ok_or(AppError::MissingCourierLocation)?;

    if points.is_empty() {
        return Ok(PlanOutcome {
            plan: RoutePlan::empty(courier.id, courier.zone_id.clone()),
            excluded: Vec::new(),
        });
    }

    // Stable descending sort keeps input order within each tier.
    let mut ordered: Vec<DeliveryPoint> = points.to_vec();
    ordered.sort_by(|a, b| b.priority.tier().cmp(&a.priority.tier()));

    let (high, normal): (Vec<DeliveryPoint>, Vec<DeliveryPoint>) = ordered
        .into_iter()
        .partition(|point| point.priority.is_high_tier());

    let mut route: Vec<DeliveryPoint> = Vec::new();
    let mut excluded: Vec<DeliveryPoint> = Vec::new();
    let mut position = start;
    let mut total_distance_km = 0.0;
    let mut total_duration_minutes: u32 = 0;
    let capacity = courier.max_deliveries_per_day;
    let speed = courier.speed_kmh();

    // Phase 1: high tiers in priority order, not by proximity.
    let mut high_iter = high.into_iter();
    for point in high_iter.by_ref() {
        if route.len() >= capacity {
            excluded.push(point);
            break;
        }

        let leg_km = haversine_km(&position, &point.position);
        if exceeds_leg_cap(courier, leg_km) {
            excluded.push(point);
            continue;
        }

        total_distance_km += leg_km;
        total_duration_minutes +=
            estimate_travel_time_minutes(&position, &point.position, speed) + point.stop_minutes();
        position = point.position;
        route.push(point);
    }
    excluded.extend(high_iter);

    // Phase 2: nearest-neighbor over the normal tiers. The closest candidate
    // beyond the leg cap is dropped for good and the scan continues on the
    // reduced set; it is never retried from a later position.
    let mut candidates = normal;
    while route.len() < capacity && !candidates.is_empty() {
        let nearest_idx = nearest_candidate(&position, &candidates);
        let leg_km = haversine_km(&position, &candidates[nearest_idx].position);

        let point = candidates.swap_remove(nearest_idx);
        if exceeds_leg_cap(courier, leg_km) {
            excluded.push(point);
            continue;
        }

        total_distance_km += leg_km;
        total_duration_minutes +=
            estimate_travel_time_minutes(&position, &point.position, speed) + point.stop_minutes();
        position = point.position;
        route.push(point);
    }
    excluded.extend(candidates);

    Ok(PlanOutcome {
        plan: RoutePlan {
            courier_id: courier.id,
            zone_id: courier.zone_id.clone(),
            delivery_points: route,
            total_distance_km: round_two_decimals(total_distance_km),
            total_duration_minutes,
        },
        excluded,
    })
}

/// Same sequencing as [`plan_route`], rendered for a map: a leading
/// current-location waypoint, then a pickup waypoint (when the order carries
/// a business location) before each dropoff.
pub fn plan_route_with_waypoints(
    courier: &Courier,
    points: &[DeliveryPoint],
) -> Result<DetailedRoute, AppError> {
    let outcome = plan_route(courier, points)?;

    // plan_route already rejected a missing position.
    let start = courier
        .current_position
        .ok_or(AppError::MissingCourierLocation)?;

    let mut waypoints = vec![Waypoint {
        kind: WaypointKind::CurrentLocation,
        position: start,
        label: format!("{} (current location)", courier.name),
        point_id: None,
    }];

    for point in &outcome.plan.delivery_points {
        if let Some(pickup) = point.pickup {
            waypoints.push(Waypoint {
                kind: WaypointKind::Pickup,
                position: pickup,
                label: format!("Pickup for {}", point.address),
                point_id: Some(point.id),
            });
        }
        waypoints.push(Waypoint {
            kind: WaypointKind::Dropoff,
            position: point.position,
            label: point.address.clone(),
            point_id: Some(point.id),
        });
    }

    Ok(DetailedRoute {
        plan: outcome.plan,
        waypoints,
        excluded: outcome.excluded,
    })
}

fn exceeds_leg_cap(courier: &Courier, leg_km: f64) -> bool {
    courier
        .max_distance_km
        .is_some_and(|max_km| leg_km > max_km)
}

fn nearest_candidate(position: &GeoPoint, candidates: &[DeliveryPoint]) -> usize {
    let mut best_idx = 0;
    let mut best_km = f64::INFINITY;

    for (idx, candidate) in candidates.iter().enumerate() {
        let km = haversine_km(position, &candidate.position);
        if km < best_km {
            best_km = km;
            best_idx = idx;
        }
    }

    best_idx
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{plan_route, plan_route_with_waypoints};
    use crate::error::AppError;
    use crate::geo::haversine_km;
    use crate::models::courier::Courier;
    use crate::models::plan::WaypointKind;
    use crate::models::point::{DeliveryPoint, GeoPoint, Priority};

    const BASE: GeoPoint = GeoPoint {
        lat: 41.0082,
        lng: 28.9784,
    };

    fn courier(capacity: usize, max_distance_km: Option<f64>) -> Courier {
        Courier {
            id: Uuid::from_u128(1),
            name: "test-courier".to_string(),
            current_position: Some(BASE),
            zone_id: None,
            max_deliveries_per_day: capacity,
            max_distance_km,
            average_speed_kmh: None,
            available: true,
            updated_at: Utc::now(),
        }
    }

    fn point(id_seed: u128, lat: f64, lng: f64, priority: Priority) -> DeliveryPoint {
        DeliveryPoint {
            id: Uuid::from_u128(id_seed),
            position: GeoPoint { lat, lng },
            pickup: None,
            address: format!("stop-{id_seed}"),
            customer_name: None,
            priority,
            estimated_duration_minutes: None,
            status: "ReadyToRoute".to_string(),
            estimated_arrival: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_plan() {
        let outcome = plan_route(&courier(10, None), &[]).unwrap();
        assert!(outcome.plan.delivery_points.is_empty());
        assert_eq!(outcome.plan.total_distance_km, 0.0);
        assert_eq!(outcome.plan.total_duration_minutes, 0);
        assert!(outcome.excluded.is_empty());
    }

    #[test]
    fn missing_location_is_an_error() {
        let mut no_position = courier(10, None);
        no_position.current_position = None;

        let result = plan_route(&no_position, &[point(1, 41.01, 28.98, Priority::Low)]);
        assert!(matches!(result, Err(AppError::MissingCourierLocation)));
    }

    #[test]
    fn urgent_point_precedes_nearby_low_point() {
        // The urgent stop is ~20 km out, the low one a few hundred meters.
        let far_urgent = point(1, 41.19, 28.98, Priority::Urgent);
        let near_low = point(2, 41.0083, 28.9785, Priority::Low);

        let outcome = plan_route(&courier(10, None), &[near_low, far_urgent]).unwrap();
        let ids: Vec<_> = outcome.plan.delivery_points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
    }

    #[test]
    fn capacity_bounds_the_route() {
        let points: Vec<_> = (0..5)
            .map(|i| point(i, 41.01 + 0.001 * i as f64, 28.98, Priority::Medium))
            .collect();

        let outcome = plan_route(&courier(2, None), &points).unwrap();
        assert_eq!(outcome.plan.delivery_points.len(), 2);
        assert_eq!(outcome.excluded.len(), 3);
    }

    #[test]
    fn leg_over_max_distance_is_excluded_from_route_and_totals() {
        let near = point(1, 41.0098, 28.9784, Priority::Medium); // ~0.2 km
        let far = point(2, 41.10, 28.98, Priority::Medium); // ~10 km

        let outcome = plan_route(&courier(10, Some(1.0)), &[near.clone(), far]).unwrap();

        assert_eq!(outcome.plan.delivery_points.len(), 1);
        assert_eq!(outcome.plan.delivery_points[0].id, near.id);
        assert_eq!(outcome.excluded.len(), 1);
        assert_eq!(outcome.excluded[0].id, Uuid::from_u128(2));

        let near_leg = haversine_km(&BASE, &near.position);
        assert!((outcome.plan.total_distance_km - near_leg).abs() < 0.01);
        // One short leg plus the default 10-minute stop; the far leg's
        // travel time must not appear.
        assert_eq!(outcome.plan.total_duration_minutes, 11);
    }

    #[test]
    fn high_priority_leg_over_cap_is_skipped_without_stopping_the_phase() {
        let far_urgent = point(1, 41.50, 28.98, Priority::Urgent);
        let near_high = point(2, 41.0098, 28.9784, Priority::High);

        let outcome = plan_route(&courier(10, Some(5.0)), &[far_urgent, near_high]).unwrap();
        let ids: Vec<_> = outcome.plan.delivery_points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(2)]);
        assert_eq!(outcome.excluded[0].id, Uuid::from_u128(1));
    }

    #[test]
    fn normal_points_follow_nearest_neighbor_order() {
        // Three medium stops roughly 2, 5 and 8 km north of the courier,
        // supplied in shuffled order.
        let two_km = point(1, 41.0262, 28.9784, Priority::Medium);
        let five_km = point(2, 41.0532, 28.9784, Priority::Medium);
        let eight_km = point(3, 41.0802, 28.9784, Priority::Medium);

        let d2 = haversine_km(&BASE, &two_km.position);
        let d5 = haversine_km(&BASE, &five_km.position);
        let d8 = haversine_km(&BASE, &eight_km.position);
        assert!(d2 < d5 && d5 < d8);

        let outcome = plan_route(
            &courier(10, None),
            &[eight_km.clone(), two_km.clone(), five_km.clone()],
        )
        .unwrap();

        let ids: Vec<_> = outcome.plan.delivery_points.iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)]
        );
        assert!(outcome.excluded.is_empty());

        let expected = d2
            + haversine_km(&two_km.position, &five_km.position)
            + haversine_km(&five_km.position, &eight_km.position);
        assert!((outcome.plan.total_distance_km - expected).abs() < 0.01);
    }

    #[test]
    fn stop_minutes_default_to_ten() {
        let mut with_estimate = point(1, 41.0098, 28.9784, Priority::Medium);
        with_estimate.estimated_duration_minutes = Some(4);

        let fixed = plan_route(&courier(10, None), &[with_estimate.clone()]).unwrap();
        with_estimate.estimated_duration_minutes = None;
        let defaulted = plan_route(&courier(10, None), &[with_estimate]).unwrap();

        assert_eq!(
            defaulted.plan.total_duration_minutes - fixed.plan.total_duration_minutes,
            6
        );
    }

    #[test]
    fn waypoints_alternate_pickup_and_dropoff() {
        let mut first = point(1, 41.02, 28.98, Priority::Medium);
        first.pickup = Some(GeoPoint {
            lat: 41.015,
            lng: 28.97,
        });
        let second = point(2, 41.03, 28.98, Priority::Medium);

        let detailed =
            plan_route_with_waypoints(&courier(10, None), &[first, second]).unwrap();

        let kinds: Vec<_> = detailed.waypoints.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WaypointKind::CurrentLocation,
                WaypointKind::Pickup,
                WaypointKind::Dropoff,
                WaypointKind::Dropoff,
            ]
        );
        assert_eq!(detailed.plan.delivery_points.len(), 2);
    }
}
