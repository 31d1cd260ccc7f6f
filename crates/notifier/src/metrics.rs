use lazy_static::lazy_static;
use prometheus::{register_int_counter_with_registry, Encoder, IntCounter, Registry, TextEncoder};

use crate::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref FETCHES_TOTAL: IntCounter = register_int_counter_with_registry!(
        "alertnotifier_fetches_total",
        "Total number of alert list fetches.",
        REGISTRY
    )
    .expect("alertnotifier_fetches_total is registered once");
    pub static ref FETCH_FAILURES_TOTAL: IntCounter = register_int_counter_with_registry!(
        "alertnotifier_fetch_failures_total",
        "Total number of alert list fetches that failed.",
        REGISTRY
    )
    .expect("alertnotifier_fetch_failures_total is registered once");
    pub static ref NOTIFICATIONS_SENT_TOTAL: IntCounter = register_int_counter_with_registry!(
        "alertnotifier_notifications_sent_total",
        "Total number of notifications handed to a sink.",
        REGISTRY
    )
    .expect("alertnotifier_notifications_sent_total is registered once");
}

/// Text exposition of every counter.
pub fn gather_metrics() -> Result<String> {
    // Touch the counters so they are registered even before first use.
    lazy_static::initialize(&FETCHES_TOTAL);
    lazy_static::initialize(&FETCH_FAILURES_TOTAL);
    lazy_static::initialize(&NOTIFICATIONS_SENT_TOTAL);

    let mut buffer = vec![];
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::Internal(format!("metrics are not UTF-8: {}", e)))
}
