//! Span capability and scope-bound finalization.
//!
//! # Responsibilities
//! - Define the span capability consumed by request handlers
//! - Provide the cloneable handle threaded through handler signatures
//! - Guarantee exactly-once span finalization across success, failure,
//!   and cancellation
//!
//! # Design Decisions
//! - Trace context is an explicit `SpanHandle` parameter, not a task-local:
//!   portable across executors and trivial to test
//! - Finalization rides on `Drop`, so dropping an in-flight request future
//!   (client disconnect, timeout) still closes the span exactly once

pub mod noop;

pub use noop::NoopSpan;

use std::fmt;
use std::sync::Arc;

/// One active unit of traced work.
///
/// Implementations are provided by entry points; handlers only attach
/// fields, spawn children, and read identifiers. Every identifier query is
/// optional: absent means tracing is inactive for this request.
pub trait TraceSpan: Send + Sync {
    /// Attach a key/value field to the span.
    fn record(&self, key: &str, value: &str);

    /// Create a child span for a nested unit of work.
    fn child(&self, name: &str) -> SpanHandle;

    /// Identifier of the trace this span belongs to, if tracked.
    fn trace_id(&self) -> Option<String>;

    /// Identifier of this span, if tracked.
    fn span_id(&self) -> Option<String>;

    /// URL of this trace in a viewer, if one is configured.
    fn trace_url(&self) -> Option<String>;
}

/// Shared handle to an active span.
///
/// Cloning is cheap; all clones refer to the same span. The handle is
/// read-only context: nothing a handler does through it affects the span's
/// lifetime, which belongs to the [`SpanGuard`].
#[derive(Clone)]
pub struct SpanHandle(Arc<dyn TraceSpan>);

impl SpanHandle {
    pub fn new(span: impl TraceSpan + 'static) -> Self {
        Self(Arc::new(span))
    }

    /// A handle to a span that tracks nothing. Supplied wherever
    /// context-dependent code must run outside any request.
    pub fn noop() -> Self {
        Self::new(NoopSpan)
    }

    pub fn record(&self, key: &str, value: &str) {
        self.0.record(key, value);
    }

    pub fn child(&self, name: &str) -> SpanHandle {
        self.0.child(name)
    }

    pub fn trace_id(&self) -> Option<String> {
        self.0.trace_id()
    }

    pub fn span_id(&self) -> Option<String> {
        self.0.span_id()
    }

    pub fn trace_url(&self) -> Option<String> {
        self.0.trace_url()
    }
}

impl fmt::Debug for SpanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanHandle")
            .field("trace_id", &self.trace_id())
            .field("span_id", &self.span_id())
            .finish()
    }
}

/// Scope-bound acquisition of a span.
///
/// The finalizer runs exactly once: when the guard is dropped, whether that
/// happens at normal scope exit, during error propagation, or because the
/// owning future was cancelled mid-flight. A guard with no finalizer
/// ([`SpanGuard::noop`]) is valid everywhere a real one is.
pub struct SpanGuard {
    span: SpanHandle,
    finish: Option<Box<dyn FnOnce() + Send>>,
}

impl SpanGuard {
    pub fn new<F>(span: SpanHandle, finish: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            span,
            finish: Some(Box::new(finish)),
        }
    }

    /// A guard around a noop span with nothing to finalize.
    pub fn noop() -> Self {
        Self {
            span: SpanHandle::noop(),
            finish: None,
        }
    }

    /// Borrow the guarded span.
    pub fn span(&self) -> &SpanHandle {
        &self.span
    }

    /// Clone out a handle that survives independently of the guard.
    pub fn handle(&self) -> SpanHandle {
        self.span.clone()
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(finish) = self.finish.take() {
            finish();
        }
    }
}

impl fmt::Debug for SpanGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanGuard")
            .field("span", &self.span)
            .field("pending", &self.finish.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_guard_finalizes_once_on_drop() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let guard = SpanGuard::new(SpanHandle::noop(), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(count.load(Ordering::SeqCst), 0);
        drop(guard);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_outlives_guard() {
        let guard = SpanGuard::new(SpanHandle::noop(), || {});
        let handle = guard.handle();
        drop(guard);

        // The handle stays usable; only the scope is closed.
        handle.record("key", "value");
        assert!(handle.trace_id().is_none());
    }

    #[test]
    fn test_noop_guard_is_inert() {
        let guard = SpanGuard::noop();
        assert!(guard.span().trace_id().is_none());
        drop(guard);
    }
}
