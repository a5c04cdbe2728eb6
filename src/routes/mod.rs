//! Route abstraction and context lifting.
//!
//! # Responsibilities
//! - Define the handler shape shared by context-bound and bare routes
//! - Convert between the two parameterizations (`lift` / `lower`)
//!
//! # Design Decisions
//! - Both variants are one trait parameterized by the execution-context
//!   type: `Routes<SpanHandle>` is context-bound, `Routes<()>` is bare
//! - `None` means "no route matched" and is never an error
//! - Handler errors are `tower::BoxError` and pass through every wrapper
//!   in this module unchanged
//! - `lift` then `lower` is observationally the identity on the wrapped
//!   routes: the span handle is read-only context

pub mod adapter;
pub mod resource;
pub mod service;
pub mod upgrade;

pub use adapter::{adapt_routes, adapt_routes_with, AdaptedRoutes};
pub use resource::{
    adapt_resource_routes, adapt_resource_routes_with, adapt_resource_upgrade_routes,
    adapt_resource_upgrade_routes_with, Acquired, TeardownFn, TracedResource,
};
pub use service::RouteService;
pub use upgrade::{
    adapt_upgrade_routes, adapt_upgrade_routes_with, lift_upgrade, upgrade_fn, UpgradeBuilder,
    UpgradeRoutes,
};

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use tower::BoxError;

use crate::span::SpanHandle;

/// Outcome of one routing attempt: a response, "no route matched", or the
/// handler's own error.
pub type RouteResult = Result<Option<Response>, BoxError>;

/// Boxed future produced by a routing call.
pub type RouteFuture = BoxFuture<'static, RouteResult>;

/// A request handler parameterized over the execution context it needs.
///
/// `Cx = SpanHandle` for handlers that read ambient trace context,
/// `Cx = ()` for handlers that do not.
pub trait Routes<Cx>: Send + Sync + 'static {
    fn call(&self, cx: Cx, req: Request<Body>) -> RouteFuture;
}

impl<Cx, R> Routes<Cx> for Arc<R>
where
    R: Routes<Cx> + ?Sized,
{
    fn call(&self, cx: Cx, req: Request<Body>) -> RouteFuture {
        (**self).call(cx, req)
    }
}

/// Adapt an async closure into [`Routes`].
///
/// The closure receives the context and the request, mirroring
/// `tower::service_fn`.
pub fn route_fn<F>(f: F) -> RouteFn<F> {
    RouteFn { f }
}

/// [`Routes`] returned by [`route_fn`].
#[derive(Clone)]
pub struct RouteFn<F> {
    f: F,
}

impl<Cx, F, Fut> Routes<Cx> for RouteFn<F>
where
    F: Fn(Cx, Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RouteResult> + Send + 'static,
{
    fn call(&self, cx: Cx, req: Request<Body>) -> RouteFuture {
        Box::pin((self.f)(cx, req))
    }
}

/// Let trace-agnostic routes run where a context-bound handler is
/// expected. The supplied span handle is discarded.
pub fn lift<R>(routes: R) -> Lifted<R>
where
    R: Routes<()>,
{
    Lifted { inner: routes }
}

/// [`Routes`] returned by [`lift`].
#[derive(Clone)]
pub struct Lifted<R> {
    inner: R,
}

impl<R> Routes<SpanHandle> for Lifted<R>
where
    R: Routes<()>,
{
    fn call(&self, _span: SpanHandle, req: Request<Body>) -> RouteFuture {
        self.inner.call((), req)
    }
}

/// Fix the span handle of context-bound routes, producing bare routes.
///
/// Use [`SpanHandle::noop`] to run context-bound logic outside any
/// request, e.g. during resource setup or teardown.
pub fn lower<R>(span: SpanHandle, routes: R) -> Lowered<R>
where
    R: Routes<SpanHandle>,
{
    Lowered {
        span,
        inner: routes,
    }
}

/// [`Routes`] returned by [`lower`].
#[derive(Clone)]
pub struct Lowered<R> {
    span: SpanHandle,
    inner: R,
}

impl<R> Routes<()> for Lowered<R>
where
    R: Routes<SpanHandle>,
{
    fn call(&self, _cx: (), req: Request<Body>) -> RouteFuture {
        self.inner.call(self.span.clone(), req)
    }
}
