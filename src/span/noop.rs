//! Span implementation that tracks nothing.

use super::{SpanHandle, TraceSpan};

/// Stateless span used when context must be supplied but no trace is being
/// tracked, e.g. resource setup that runs outside any request. Every
/// operation is a no-op and every query reports absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

impl TraceSpan for NoopSpan {
    fn record(&self, _key: &str, _value: &str) {}

    fn child(&self, _name: &str) -> SpanHandle {
        SpanHandle::noop()
    }

    fn trace_id(&self) -> Option<String> {
        None
    }

    fn span_id(&self) -> Option<String> {
        None
    }

    fn trace_url(&self) -> Option<String> {
        None
    }
}
