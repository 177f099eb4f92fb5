//! Job lifecycle counters. The binary adds them to its registry at startup.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Opts, Registry};

lazy_static! {
    pub static ref JOB_TRANSITIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("jobboard_job_transitions_total", "Job status transitions by outcome"),
        &["operation", "outcome"]
    ).expect("Failed to create job_transitions_total metric");

    pub static ref BULK_ITEMS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("jobboard_bulk_items_total", "Items processed by bulk operations"),
        &["operation", "outcome"]
    ).expect("Failed to create bulk_items_total metric");
}

/// Add the job counters to `registry`. Already-registered counters are skipped.
pub fn register(registry: &Registry) {
    let _ = registry.register(Box::new(JOB_TRANSITIONS_TOTAL.clone()));
    let _ = registry.register(Box::new(BULK_ITEMS_TOTAL.clone()));
}

pub fn record_job_transition(operation: &str, outcome: &str) {
    JOB_TRANSITIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn record_bulk_item(operation: &str, outcome: &str) {
    BULK_ITEMS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}
