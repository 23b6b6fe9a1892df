use axum::routing::get;
use axum::Router;
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use axum_prometheus::{GenericMetricLayer, Handle, PrometheusMetricLayer};
use std::sync::OnceLock;

/// The Prometheus recorder is process-global and can only be installed once,
/// so keep the handle around and reuse it on subsequent calls (e.g. when
/// tests build multiple routers in one process).
static METRIC_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn setup_metrics() -> (PrometheusMetricLayer<'static>, Router) {
    let handle = METRIC_HANDLE.get_or_init(|| Handle::default().0).clone();
    let (prometheus_layer, metric_handle) = GenericMetricLayer::pair_from(Handle(handle));
    let app = Router::new().route("/metrics", get(|| async move { metric_handle.render() }));
    (prometheus_layer, app)
}
