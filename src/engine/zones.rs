use crate::models::point::GeoPoint;

/// Zone membership lookup. Injected so callers can plug in a real
/// point-in-polygon implementation without touching the assignment logic.
pub trait ZoneLocator: Send + Sync {
    fn locate_zone(&self, position: &GeoPoint) -> Option<String>;
}

/// Places every point in the unzoned group. This mirrors the current
/// production behavior where no zone geometry is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopZoneLocator;

impl ZoneLocator for NoopZoneLocator {
    fn locate_zone(&self, _position: &GeoPoint) -> Option<String> {
        None
    }
}
