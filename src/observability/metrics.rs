use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub match_requests_total: IntCounterVec,
    pub riders_registered: IntGauge,
    pub match_latency_seconds: HistogramVec,
    pub geocode_lookups_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let match_requests_total = IntCounterVec::new(
            Opts::new("match_requests_total", "Total match requests by outcome"),
            &["outcome"],
        )
        .expect("valid match_requests_total metric");

        let riders_registered =
            IntGauge::new("riders_registered", "Current number of registered ride offers")
                .expect("valid riders_registered metric");

        let match_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "match_latency_seconds",
                "Latency of nearby-rider matching in seconds",
            ),
            &["outcome"],
        )
        .expect("valid match_latency_seconds metric");

        let geocode_lookups_total = IntCounterVec::new(
            Opts::new("geocode_lookups_total", "Total geocode lookups by outcome"),
            &["outcome"],
        )
        .expect("valid geocode_lookups_total metric");

        registry
            .register(Box::new(match_requests_total.clone()))
            .expect("register match_requests_total");
        registry
            .register(Box::new(riders_registered.clone()))
            .expect("register riders_registered");
        registry
            .register(Box::new(match_latency_seconds.clone()))
            .expect("register match_latency_seconds");
        registry
            .register(Box::new(geocode_lookups_total.clone()))
            .expect("register geocode_lookups_total");

        Self {
            registry,
            match_requests_total,
            riders_registered,
            match_latency_seconds,
            geocode_lookups_total,
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
