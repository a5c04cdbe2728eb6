//! Trace entry points.
//!
//! # Responsibilities
//! - Decide, per request, between continuing an upstream trace and
//!   starting a new root trace
//! - Issue scope-bound span acquisitions ([`SpanGuard`])
//!
//! # Design Decisions
//! - `continue_or_root` is infallible by signature: a misconfigured or
//!   unavailable backend degrades to a noop guard, never to a failed
//!   request
//! - Entry points are shared read-only across all in-flight requests and
//!   must support concurrent acquisition

pub mod tracing;

pub use self::tracing::TracingEntryPoint;

use crate::kernel::Kernel;
use crate::span::SpanGuard;

/// Capability that creates or continues traces and issues spans.
pub trait EntryPoint: Send + Sync {
    /// Continue the trace encoded in `kernel`, or start a new root trace
    /// named after `name` (the route identifier) if the kernel carries no
    /// recognized context.
    ///
    /// The caller must run exactly one unit of work inside the returned
    /// guard's scope; dropping the guard finalizes the span.
    fn continue_or_root(&self, name: &str, kernel: &Kernel) -> SpanGuard;
}

/// Entry point used when tracing is disabled: every acquisition yields a
/// noop guard.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEntryPoint;

impl EntryPoint for NoopEntryPoint {
    fn continue_or_root(&self, _name: &str, _kernel: &Kernel) -> SpanGuard {
        SpanGuard::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_entry_point_yields_inert_guards() {
        let entry = NoopEntryPoint;
        let guard = entry.continue_or_root("/orders/42", &Kernel::default());

        assert!(guard.span().trace_id().is_none());
        assert!(guard.span().span_id().is_none());
        drop(guard);
    }
}
