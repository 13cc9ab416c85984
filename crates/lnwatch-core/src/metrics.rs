use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, Encoder,
    GaugeVec, HistogramVec, TextEncoder,
};

lazy_static! {
    pub static ref POLL_PASSES_TOTAL: CounterVec = register_counter_vec!(
        "invoice_poll_passes_total",
        "Total settlement monitor passes",
        &["backend"]
    )
    .unwrap();
    pub static ref INVOICE_LOOKUPS_TOTAL: CounterVec = register_counter_vec!(
        "invoice_lookups_total",
        "Total invoice status lookups by outcome",
        &["backend", "outcome"]
    )
    .unwrap();
    pub static ref SETTLED_INVOICES_TOTAL: CounterVec = register_counter_vec!(
        "settled_invoices_total",
        "Total invoices reported as settled",
        &["backend"]
    )
    .unwrap();
    pub static ref PENDING_INVOICES_COUNT: GaugeVec = register_gauge_vec!(
        "pending_invoices_count",
        "Number of invoices awaiting settlement",
        &["backend"]
    )
    .unwrap();
    pub static ref POLL_PASS_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "invoice_poll_pass_duration_seconds",
        "Duration of one settlement monitor pass",
        &["backend"],
        vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]
    )
    .unwrap();
}

pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_ok() {
        String::from_utf8(buffer).unwrap_or_default()
    } else {
        String::new()
    }
}
