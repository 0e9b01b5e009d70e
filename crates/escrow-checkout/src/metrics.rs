use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Checkout outcomes, one increment per request
pub static CHECKOUT_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("checkout_requests_total", "Checkout requests by outcome"),
        &["outcome"],
    )
    .unwrap()
});

// Upstream calls
pub static ESCROW_CALLS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("escrow_calls_total", "Escrow Pay calls by result"),
        &["result"],
    )
    .unwrap()
});

pub static ESCROW_CALL_LATENCY: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("escrow_call_latency_seconds", "Escrow Pay call latency")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

/// Register all metrics with the registry
pub fn register_metrics() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(CHECKOUT_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ESCROW_CALLS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ESCROW_CALL_LATENCY.clone()))?;
    Ok(())
}
