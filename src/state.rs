use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};

use crate::engine::zones::{NoopZoneLocator, ZoneLocator};
use crate::models::plan::RoutePlan;
use crate::observability::metrics::Metrics;
use crate::store::InMemoryStore;

/// One unit of work for the dispatch engine: spread the ready orders for a
/// date over the available couriers and plan each courier's route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub zone_id: Option<String>,
    pub date: NaiveDate,
}

pub struct AppState {
    pub store: InMemoryStore,
    pub zones: Arc<dyn ZoneLocator>,
    pub dispatch_tx: mpsc::Sender<DispatchRequest>,
    pub route_events_tx: broadcast::Sender<RoutePlan>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        dispatch_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<DispatchRequest>) {
        let (dispatch_tx, dispatch_rx) = mpsc::channel(dispatch_queue_size);
        let (route_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                store: InMemoryStore::new(),
                zones: Arc::new(NoopZoneLocator),
                dispatch_tx,
                route_events_tx,
                metrics: Metrics::new(),
            },
            dispatch_rx,
        )
    }
}
