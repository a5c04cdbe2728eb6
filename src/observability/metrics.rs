//! Span lifecycle metrics.
//!
//! # Metrics
//! - `trace_spans_opened_total` (counter): spans acquired, by kind
//! - `trace_spans_closed_total` (counter): spans finalized, by kind
//!
//! `kind` is `continuation` or `root`. Opened and closed counts match for
//! any quiesced process; a persistent gap indicates a leaked guard.

/// Record a span acquisition.
pub fn record_span_opened(kind: &'static str) {
    metrics::counter!("trace_spans_opened_total", "kind" => kind).increment(1);
}

/// Record a span finalization.
pub fn record_span_closed(kind: &'static str) {
    metrics::counter!("trace_spans_closed_total", "kind" => kind).increment(1);
}
