use prometheus::{
    Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub route_plans_total: IntCounterVec,
    pub dispatch_requests_in_queue: IntGauge,
    pub planning_latency_seconds: HistogramVec,
    pub route_stops_excluded_total: IntCounterVec,
    pub courier_route_load: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let route_plans_total = IntCounterVec::new(
            Opts::new("route_plans_total", "Total planning runs by outcome"),
            &["outcome"],
        )
        .expect("valid route_plans_total metric");

        let dispatch_requests_in_queue = IntGauge::new(
            "dispatch_requests_in_queue",
            "Current number of queued dispatch requests",
        )
        .expect("valid dispatch_requests_in_queue metric");

        let planning_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "planning_latency_seconds",
                "Latency of dispatch processing in seconds",
            ),
            &["outcome"],
        )
        .expect("valid planning_latency_seconds metric");

        let route_stops_excluded_total = IntCounterVec::new(
            Opts::new(
                "route_stops_excluded_total",
                "Points dropped by capacity or distance policies, by reason",
            ),
            &["reason"],
        )
        .expect("valid route_stops_excluded_total metric");

        let courier_route_load = GaugeVec::new(
            Opts::new("courier_route_load", "Stops on the courier's latest route"),
            &["courier_id"],
        )
        .expect("valid courier_route_load metric");

        registry
            .register(Box::new(route_plans_total.clone()))
            .expect("register route_plans_total");
        registry
            .register(Box::new(dispatch_requests_in_queue.clone()))
            .expect("register dispatch_requests_in_queue");
        registry
            .register(Box::new(planning_latency_seconds.clone()))
            .expect("register planning_latency_seconds");
        registry
            .register(Box::new(route_stops_excluded_total.clone()))
            .expect("register route_stops_excluded_total");
        registry
            .register(Box::new(courier_route_load.clone()))
            .expect("register courier_route_load");

        Self {
            registry,
            route_plans_total,
            dispatch_requests_in_queue,
            planning_latency_seconds,
            route_stops_excluded_total,
            courier_route_load,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
