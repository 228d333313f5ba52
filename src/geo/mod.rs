use std::f64::consts::PI;

use crate::error::AppError;
use crate::models::point::{DeliveryPoint, GeoPoint};

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Default radius for [`cluster_by_radius`].
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 2.0;

/// Anything with a coordinate the geo helpers can measure against.
pub trait Positioned {
    fn position(&self) -> GeoPoint;
}

impl Positioned for GeoPoint {
    fn position(&self) -> GeoPoint {
        *self
    }
}

impl Positioned for DeliveryPoint {
    fn position(&self) -> GeoPoint {
        self.position
    }
}

pub fn degrees_to_radians(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Great-circle distance in km, atan2-form Haversine. Symmetric, zero for
/// identical points.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let delta_lat = degrees_to_radians(b.lat - a.lat);
    let delta_lng = degrees_to_radians(b.lng - a.lng);

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let h = sin_lat * sin_lat
        + degrees_to_radians(a.lat).cos() * degrees_to_radians(b.lat).cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * central_angle
}

pub fn is_within_radius(center: &GeoPoint, point: &GeoPoint, radius_km: f64) -> bool {
    haversine_km(center, point) <= radius_km
}

/// Minutes to travel between two points at the given speed. Ceiling, so a
/// nonzero leg never estimates to zero minutes.
pub fn estimate_travel_time_minutes(a: &GeoPoint, b: &GeoPoint, speed_kmh: f64) -> u32 {
    travel_minutes_for_distance(haversine_km(a, b), speed_kmh)
}

pub fn travel_minutes_for_distance(distance_km: f64, speed_kmh: f64) -> u32 {
    (distance_km / speed_kmh * 60.0).ceil() as u32
}

/// Arithmetic mean of latitudes and longitudes.
pub fn centroid(points: &[GeoPoint]) -> Result<GeoPoint, AppError> {
    if points.is_empty() {
        return Err(AppError::InvalidArgument(
            "centroid of an empty point set".to_string(),
        ));
    }

    let count = points.len() as f64;
    let lat = points.iter().map(|p| p.lat).sum::<f64>() / count;
    let lng = points.iter().map(|p| p.lng).sum::<f64>() / count;

    Ok(GeoPoint { lat, lng })
}

/// Stable ascending sort by distance from `reference`; the input slice is
/// left untouched.
pub fn sort_by_proximity<T>(reference: &GeoPoint, items: &[T]) -> Vec<T>
where
    T: Positioned + Clone,
{
    let mut keyed: Vec<(f64, T)> = items
        .iter()
        .map(|item| (haversine_km(reference, &item.position()), item.clone()))
        .collect();

    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, item)| item).collect()
}

/// Greedy single-pass clustering: each unvisited point in input order seeds a
/// cluster and absorbs every later unvisited point within `radius_km` of the
/// seed itself, not of the cluster centroid. Membership therefore depends on
/// iteration order; kept exactly like this for compatibility with existing
/// route data, not as an approximation to "real" clustering.
pub fn cluster_by_radius<T>(items: &[T], radius_km: f64) -> Vec<Vec<T>>
where
    T: Positioned + Clone,
{
    let mut visited = vec![false; items.len()];
    let mut clusters = Vec::new();

    for seed_idx in 0..items.len() {
        if visited[seed_idx] {
            continue;
        }
        visited[seed_idx] = true;

        let seed_pos = items[seed_idx].position();
        let mut cluster = vec![items[seed_idx].clone()];

        for other_idx in seed_idx + 1..items.len() {
            if visited[other_idx] {
                continue;
            }
            if is_within_radius(&seed_pos, &items[other_idx].position(), radius_km) {
                visited[other_idx] = true;
                cluster.push(items[other_idx].clone());
            }
        }

        clusters.push(cluster);
    }

    clusters
}
