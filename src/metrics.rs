use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use lazy_static::lazy_static;
use std::sync::Once;
use std::time::Duration;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref ACTIONS_DISPATCHED: IntCounterVec = IntCounterVec::new(
        Opts::new("actions_dispatched_total", "Messages handled, by action"),
        &["action"]
    ).unwrap();

    pub static ref ACTION_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("action_errors_total", "Actions that answered with an apology"),
        &["action"]
    ).unwrap();

    pub static ref UPSTREAM_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("upstream_calls_total", "Outbound HTTP calls, by provider"),
        &["provider"]
    ).unwrap();

    pub static ref UPSTREAM_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("upstream_errors_total", "Failed outbound HTTP calls, by provider"),
        &["provider"]
    ).unwrap();

    pub static ref UPSTREAM_LATENCY: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "upstream_latency_seconds",
            "Outbound HTTP latency in seconds"
        ).buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0]),
        &["provider"]
    ).unwrap();
}

static INIT: Once = Once::new();

fn register_all() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(ACTIONS_DISPATCHED.clone()))?;
    REGISTRY.register(Box::new(ACTION_ERRORS.clone()))?;
    REGISTRY.register(Box::new(UPSTREAM_CALLS.clone()))?;
    REGISTRY.register(Box::new(UPSTREAM_ERRORS.clone()))?;
    REGISTRY.register(Box::new(UPSTREAM_LATENCY.clone()))?;
    Ok(())
}

pub fn init() -> Result<(), prometheus::Error> {
    let mut result = Ok(());
    INIT.call_once(|| result = register_all());
    result
}

pub fn record_upstream(provider: &str, elapsed: Duration, ok: bool) {
    UPSTREAM_CALLS.with_label_values(&[provider]).inc();
    UPSTREAM_LATENCY
        .with_label_values(&[provider])
        .observe(elapsed.as_secs_f64());
    if !ok {
        UPSTREAM_ERRORS.with_label_values(&[provider]).inc();
    }
}

pub fn record_action(action: &str, failed: bool) {
    ACTIONS_DISPATCHED.with_label_values(&[action]).inc();
    if failed {
        ACTION_ERRORS.with_label_values(&[action]).inc();
    }
}

/// Prometheus text exposition of everything registered.
pub fn render() -> Result<String, prometheus::Error> {
    init()?;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
