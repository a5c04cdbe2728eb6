//! Request-tracing adapter for axum/tower services.
//!
//! Sits between an HTTP pipeline and a distributed-tracing backend: every
//! inbound request is wrapped in a trace span, and upstream trace context
//! is picked up from a redaction-filtered header subset.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → kernel   (propagation header subset, redaction policy applied)
//!     → entry    (continue upstream trace, or start a root span)
//!     → routes   (handlers run with the span handle in scope)
//!     → response (span stays open until the body is fully produced)
//! ```
//!
//! The span closes exactly once on every path: success, handler error,
//! unmatched route, or cancellation.

pub mod config;
pub mod entry;
pub mod kernel;
pub mod observability;
pub mod routes;
pub mod span;

pub use config::{ConfigError, TraceConfig};
pub use entry::{EntryPoint, NoopEntryPoint, TracingEntryPoint};
pub use kernel::{is_kernel_header, HeaderFilter, Kernel};
pub use routes::{
    adapt_resource_routes, adapt_resource_upgrade_routes, adapt_routes, adapt_routes_with,
    adapt_upgrade_routes, adapt_upgrade_routes_with, lift, lift_upgrade, lower, route_fn,
    upgrade_fn, Acquired, AdaptedRoutes, RouteFuture, RouteResult, RouteService, Routes,
    TeardownFn, TracedResource, UpgradeBuilder, UpgradeRoutes,
};
pub use span::{NoopSpan, SpanGuard, SpanHandle, TraceSpan};
