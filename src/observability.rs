use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

// ── Booking metrics ─────────────────────────────────────────────

/// Counter: create attempts. Labels: outcome (`admitted` or an error label).
pub const ADMISSIONS_TOTAL: &str = "roombook_admissions_total";

/// Histogram: create latency in seconds, parsing through store commit.
pub const ADMISSION_DURATION_SECONDS: &str = "roombook_admission_duration_seconds";

/// Counter: delete attempts. Labels: outcome (`deleted`, `not_found`).
pub const DELETIONS_TOTAL: &str = "roombook_deletions_total";

/// Counter: list-for-room queries.
pub const LIST_QUERIES_TOTAL: &str = "roombook_list_queries_total";

const DEFAULT_LOG_FILTER: &str = "roombook=info,tower_http=info";

/// Install the fmt subscriber, filtered by `RUST_LOG` when set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init_metrics(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
