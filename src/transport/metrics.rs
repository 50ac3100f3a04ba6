use crate::ErrorKind;
use http::{Method, StatusCode};
use std::time::Duration;

pub(crate) struct InFlightGuard {
    gauge: metrics::Gauge,
}

impl InFlightGuard {
    pub(crate) fn new() -> Self {
        let gauge = metrics::gauge!("idler_client_inflight");
        gauge.increment(1.0);
        Self { gauge }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.decrement(1.0);
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::UnexpectedStatus => "unexpected_status",
        ErrorKind::Transport => "transport",
        ErrorKind::Decode => "decode",
        ErrorKind::InvalidConfig => "invalid_config",
    }
}

/// Idler endpoint label (`isidle` / `unidle`), derived from the request path.
fn call_label(path: &str) -> &'static str {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let _namespace = segments.next();
    match segments.next() {
        Some("isidle") => "isidle",
        Some("unidle") => "unidle",
        _ => "other",
    }
}

pub(crate) fn record_outcome(
    method: &Method,
    path: &str,
    status: Option<StatusCode>,
    latency: Duration,
    error_kind: Option<ErrorKind>,
) {
    let method: metrics::SharedString = method.to_string().into();
    let call = call_label(path);
    let status_class = status.map(status_class).unwrap_or("transport");

    metrics::counter!(
        "idler_client_requests_total",
        "method" => method.clone(),
        "call" => call,
        "status_class" => status_class
    )
    .increment(1);
    metrics::histogram!(
        "idler_client_request_duration_seconds",
        "method" => method.clone(),
        "call" => call,
        "status_class" => status_class
    )
    .record(latency);

    if let Some(kind) = error_kind {
        metrics::counter!(
            "idler_client_errors_total",
            "method" => method,
            "call" => call,
            "kind" => error_kind_label(kind)
        )
        .increment(1);
    }
}
