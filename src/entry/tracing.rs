//! Entry point backed by the `tracing` crate.
//!
//! # Responsibilities
//! - Emit a `tracing` span per request, continuing an upstream trace when
//!   the kernel carries the propagation header
//! - Mint fresh trace identifiers for root spans
//! - Surface open/close counters and per-span timing
//!
//! # Design Decisions
//! - `tracing` span names must be `'static`, so spans use fixed names and
//!   carry the route / operation name as fields
//! - Continuation is field-level: the upstream trace id is adopted and
//!   recorded on the span; backends that need subscriber-level parenting
//!   implement [`EntryPoint`] directly
//! - Span ids come from the active subscriber and are absent when no
//!   subscriber is installed, matching the "absent when tracing is
//!   inactive" contract

use std::time::Instant;

use tracing::Span;
use uuid::Uuid;

use super::EntryPoint;
use crate::kernel::Kernel;
use crate::observability::metrics;
use crate::span::{SpanGuard, SpanHandle, TraceSpan};

/// Header consulted for an upstream trace id unless overridden.
pub const DEFAULT_PROPAGATION_HEADER: &str = "x-trace-id";

/// Entry point that maps trace acquisition onto `tracing` spans.
#[derive(Debug, Clone)]
pub struct TracingEntryPoint {
    propagation_header: String,
    viewer_base: Option<String>,
}

impl TracingEntryPoint {
    pub fn new() -> Self {
        Self {
            propagation_header: DEFAULT_PROPAGATION_HEADER.to_string(),
            viewer_base: None,
        }
    }

    /// Override the header consulted for an upstream trace id.
    pub fn with_propagation_header(mut self, name: impl Into<String>) -> Self {
        self.propagation_header = name.into().to_ascii_lowercase();
        self
    }

    /// Set the base URL under which traces can be viewed.
    pub fn with_viewer_base(mut self, base: impl Into<String>) -> Self {
        self.viewer_base = Some(base.into());
        self
    }
}

impl Default for TracingEntryPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryPoint for TracingEntryPoint {
    fn continue_or_root(&self, name: &str, kernel: &Kernel) -> SpanGuard {
        let upstream = kernel.get(&self.propagation_header);
        let kind = if upstream.is_some() { "continuation" } else { "root" };
        let trace_id = match upstream {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().simple().to_string(),
        };

        let span = tracing::info_span!("request", route = %name, trace_id = %trace_id, kind);
        tracing::debug!(parent: &span, kernel_headers = kernel.len(), "span opened");
        metrics::record_span_opened(kind);

        let handle = SpanHandle::new(TracingSpan {
            span: span.clone(),
            trace_id,
            viewer_base: self.viewer_base.clone(),
        });
        let started = Instant::now();
        SpanGuard::new(handle, move || {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            tracing::debug!(parent: &span, elapsed_ms, "span closed");
            metrics::record_span_closed(kind);
        })
    }
}

/// Span implementation wrapping a `tracing` span.
struct TracingSpan {
    span: Span,
    trace_id: String,
    viewer_base: Option<String>,
}

impl TraceSpan for TracingSpan {
    fn record(&self, key: &str, value: &str) {
        tracing::debug!(parent: &self.span, key = %key, value = %value, "field");
    }

    fn child(&self, name: &str) -> SpanHandle {
        let child =
            tracing::info_span!(parent: &self.span, "operation", name = %name, trace_id = %self.trace_id);
        SpanHandle::new(TracingSpan {
            span: child,
            trace_id: self.trace_id.clone(),
            viewer_base: self.viewer_base.clone(),
        })
    }

    fn trace_id(&self) -> Option<String> {
        Some(self.trace_id.clone())
    }

    fn span_id(&self) -> Option<String> {
        self.span.id().map(|id| id.into_u64().to_string())
    }

    fn trace_url(&self) -> Option<String> {
        self.viewer_base
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), self.trace_id))
    }
}
