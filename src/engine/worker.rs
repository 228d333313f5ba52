use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::engine::dispatch::assign_deliveries;
use crate::engine::planner::plan_route;
use crate::error::AppError;
use crate::state::{AppState, DispatchRequest};
use crate::store::RoutePersistence;

/// Long-running consumer of dispatch requests: fetch, assign, plan per
/// courier, persist, broadcast. Each request is independent; a failure is
/// logged and counted, never retried here.
pub async fn run_dispatch_engine(
    state: Arc<AppState>,
    mut dispatch_rx: mpsc::Receiver<DispatchRequest>,
) {
    info!("dispatch engine started");

    while let Some(request) = dispatch_rx.recv().await {
        state.metrics.dispatch_requests_in_queue.dec();

        let start = Instant::now();
        let outcome = process_dispatch(&state, &request);
        let elapsed = start.elapsed().as_secs_f64();

        let label = match &outcome {
            Ok(_) => "success",
            Err(_) => "error",
        };
        state
            .metrics
            .planning_latency_seconds
            .with_label_values(&[label])
            .observe(elapsed);
        state
            .metrics
            .route_plans_total
            .with_label_values(&[label])
            .inc();

        if let Err(err) = outcome {
            error!(error = %err, date = %request.date, "dispatch run failed");
        }
    }

    warn!("dispatch engine stopped: queue channel closed");
}

fn process_dispatch(state: &AppState, request: &DispatchRequest) -> Result<(), AppError> {
    let zone = request.zone_id.as_deref();
    let couriers = state.store.fetch_available_couriers(zone, request.date);
    if couriers.is_empty() {
        return Err(AppError::NoAvailableCouriers);
    }

    let points = state.store.fetch_plannable_orders(zone, request.date);
    if points.is_empty() {
        info!(date = %request.date, "no plannable orders");
        return Ok(());
    }

    let assignment = assign_deliveries(&couriers, &points, state.zones.as_ref());
    if !assignment.unassigned.is_empty() {
        state
            .metrics
            .route_stops_excluded_total
            .with_label_values(&["unassigned"])
            .inc_by(assignment.unassigned.len() as u64);
        warn!(
            count = assignment.unassigned.len(),
            date = %request.date,
            "points left unassigned by round-robin"
        );
    }

    for courier in &couriers {
        let Some(bucket) = assignment.assignments.get(&courier.id) else {
            continue;
        };

        if courier.current_position.is_none() {
            warn!(courier_id = %courier.id, "courier has no position; bucket skipped");
            continue;
        }

        let outcome = plan_route(courier, bucket)?;
        if !outcome.excluded.is_empty() {
            state
                .metrics
                .route_stops_excluded_total
                .with_label_values(&["plan"])
                .inc_by(outcome.excluded.len() as u64);
        }

        state
            .store
            .persist_route_plan(&outcome.plan, request.date)?;

        state
            .metrics
            .courier_route_load
            .with_label_values(&[&courier.id.to_string()])
            .set(outcome.plan.delivery_points.len() as f64);

        info!(
            courier_id = %courier.id,
            stops = outcome.plan.delivery_points.len(),
            distance_km = outcome.plan.total_distance_km,
            "route planned"
        );

        let _ = state.route_events_tx.send(outcome.plan);
    }

    Ok(())
}
