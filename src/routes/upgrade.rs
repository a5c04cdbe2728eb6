//! Context lifting for upgrade-capable route factories.
//!
//! # Responsibilities
//! - Carry a WebSocket upgrade capability alongside an execution context
//! - Re-map that context parameter without touching upgrade mechanics
//! - Adapt upgrade-capable factories through the same kernel/span pipeline
//!   as plain routes
//!
//! # Design Decisions
//! - Upgrade mechanics stay axum's; this module only moves the context
//! - Completing an "upgrade" on a request that never asked for one yields
//!   426 Upgrade Required instead of an error

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::FromRequestParts;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

use super::adapter::{adapt_routes_with, AdaptedRoutes};
use super::{RouteFuture, Routes};
use crate::entry::EntryPoint;
use crate::kernel::HeaderFilter;
use crate::span::SpanHandle;

/// Per-request capability for completing a bidirectional streaming
/// upgrade, paired with the execution context handed to the connection
/// callback.
pub struct UpgradeBuilder<Cx> {
    upgrade: Option<WebSocketUpgrade>,
    context: Cx,
}

impl<Cx> UpgradeBuilder<Cx> {
    /// Extract the upgrade capability from a request. A request that is
    /// not an upgrade request produces a builder whose [`on_upgrade`]
    /// falls back to 426.
    ///
    /// [`on_upgrade`]: UpgradeBuilder::on_upgrade
    pub async fn from_request(req: Request<Body>, context: Cx) -> (Request<Body>, Self) {
        let (mut parts, body) = req.into_parts();
        let upgrade = WebSocketUpgrade::from_request_parts(&mut parts, &()).await.ok();
        (
            Request::from_parts(parts, body),
            Self { upgrade, context },
        )
    }

    /// Whether the underlying request actually asked for an upgrade.
    pub fn is_upgrade(&self) -> bool {
        self.upgrade.is_some()
    }

    pub fn context(&self) -> &Cx {
        &self.context
    }

    /// Re-map the context parameter, leaving the upgrade untouched.
    pub fn map_context<D>(self, f: impl FnOnce(Cx) -> D) -> UpgradeBuilder<D> {
        UpgradeBuilder {
            upgrade: self.upgrade,
            context: f(self.context),
        }
    }

    /// Complete the upgrade, running `callback` with the connection and
    /// the carried context once the handshake finishes.
    pub fn on_upgrade<F, Fut>(self, callback: F) -> Response
    where
        Cx: Send + 'static,
        F: FnOnce(WebSocket, Cx) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        match self.upgrade {
            Some(ws) => {
                let context = self.context;
                ws.on_upgrade(move |socket| callback(socket, context))
            }
            None => {
                tracing::warn!("upgrade completed on a non-upgrade request");
                (StatusCode::UPGRADE_REQUIRED, "Upgrade required").into_response()
            }
        }
    }
}

/// An upgrade-capable route factory: given the per-request upgrade
/// capability (carrying context `Cx`) and the request, produce the routing
/// outcome.
pub trait UpgradeRoutes<Cx>: Send + Sync + 'static {
    fn call(&self, upgrade: UpgradeBuilder<Cx>, req: Request<Body>) -> RouteFuture;
}

impl<Cx, R> UpgradeRoutes<Cx> for Arc<R>
where
    R: UpgradeRoutes<Cx> + ?Sized,
{
    fn call(&self, upgrade: UpgradeBuilder<Cx>, req: Request<Body>) -> RouteFuture {
        (**self).call(upgrade, req)
    }
}

/// Adapt an async closure into [`UpgradeRoutes`].
pub fn upgrade_fn<F>(f: F) -> UpgradeFn<F> {
    UpgradeFn { f }
}

/// [`UpgradeRoutes`] returned by [`upgrade_fn`].
#[derive(Clone)]
pub struct UpgradeFn<F> {
    f: F,
}

impl<Cx, F, Fut> UpgradeRoutes<Cx> for UpgradeFn<F>
where
    F: Fn(UpgradeBuilder<Cx>, Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = super::RouteResult> + Send + 'static,
{
    fn call(&self, upgrade: UpgradeBuilder<Cx>, req: Request<Body>) -> RouteFuture {
        Box::pin((self.f)(upgrade, req))
    }
}

/// Let a trace-agnostic upgrade factory run where a context-bound one is
/// expected: the span context is stripped from the builder before the
/// factory sees it.
pub fn lift_upgrade<R>(factory: R) -> LiftedUpgrade<R>
where
    R: UpgradeRoutes<()>,
{
    LiftedUpgrade { inner: factory }
}

/// [`UpgradeRoutes`] returned by [`lift_upgrade`].
#[derive(Clone)]
pub struct LiftedUpgrade<R> {
    inner: R,
}

impl<R> UpgradeRoutes<SpanHandle> for LiftedUpgrade<R>
where
    R: UpgradeRoutes<()>,
{
    fn call(&self, upgrade: UpgradeBuilder<SpanHandle>, req: Request<Body>) -> RouteFuture {
        self.inner.call(upgrade.map_context(|_| ()), req)
    }
}

/// Adapt an upgrade-capable factory with the default redaction filter.
pub fn adapt_upgrade_routes<R>(
    entry: Arc<dyn EntryPoint>,
    factory: R,
) -> AdaptedRoutes<UpgradeAdapter<R>>
where
    R: UpgradeRoutes<SpanHandle>,
{
    adapt_upgrade_routes_with(entry, factory, HeaderFilter::default())
}

/// Adapt an upgrade-capable factory with a caller-supplied kernel filter.
///
/// The factory's upgrade builder carries the request's span, so connection
/// callbacks run with the same trace context as the handshake; everything
/// else delegates to [`adapt_routes_with`].
pub fn adapt_upgrade_routes_with<R>(
    entry: Arc<dyn EntryPoint>,
    factory: R,
    filter: HeaderFilter,
) -> AdaptedRoutes<UpgradeAdapter<R>>
where
    R: UpgradeRoutes<SpanHandle>,
{
    adapt_routes_with(
        entry,
        UpgradeAdapter {
            factory: Arc::new(factory),
        },
        filter,
    )
}

/// Context-bound routes that thread the span into the upgrade builder
/// before invoking the factory.
pub struct UpgradeAdapter<R> {
    factory: Arc<R>,
}

impl<R> Clone for UpgradeAdapter<R> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
        }
    }
}

impl<R> Routes<SpanHandle> for UpgradeAdapter<R>
where
    R: UpgradeRoutes<SpanHandle>,
{
    fn call(&self, span: SpanHandle, req: Request<Body>) -> RouteFuture {
        let factory = self.factory.clone();
        Box::pin(async move {
            let (req, upgrade) = UpgradeBuilder::from_request(req, span).await;
            factory.call(upgrade, req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_request() -> Request<Body> {
        Request::builder()
            .uri("/ws")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_plain_request_is_not_an_upgrade() {
        let (_req, builder) = UpgradeBuilder::from_request(plain_request(), ()).await;
        assert!(!builder.is_upgrade());
    }

    #[tokio::test]
    async fn test_on_upgrade_without_handshake_yields_426() {
        let (_req, builder) = UpgradeBuilder::from_request(plain_request(), ()).await;
        let response = builder.on_upgrade(|_socket, ()| async {});
        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    }

    #[tokio::test]
    async fn test_map_context_replaces_only_context() {
        let (_req, builder) = UpgradeBuilder::from_request(plain_request(), 7_u32).await;
        let mapped = builder.map_context(|n| n.to_string());
        assert_eq!(mapped.context(), "7");
        assert!(!mapped.is_upgrade());
    }

    #[tokio::test]
    async fn test_lift_upgrade_strips_span_context() {
        let factory = lift_upgrade(upgrade_fn(
            |builder: UpgradeBuilder<()>, _req: Request<Body>| async move {
                assert!(builder.context() == &());
                Ok(None)
            },
        ));

        let (req, builder) =
            UpgradeBuilder::from_request(plain_request(), SpanHandle::noop()).await;
        let outcome = UpgradeRoutes::call(&factory, builder, req).await.unwrap();
        assert!(outcome.is_none());
    }
}
