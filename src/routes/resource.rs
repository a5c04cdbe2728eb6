//! Adaptation for routes built behind a scoped resource.
//!
//! # Responsibilities
//! - Represent route values produced by paired acquire/release actions
//!   that are written against an ambient span
//! - Run those lifecycle actions under a noop span, so startup and
//!   shutdown never land in a request trace
//!
//! # Design Decisions
//! - Teardown is explicit and async ([`Acquired::release`]); dropping an
//!   acquired value without releasing it logs a warning instead of
//!   silently skipping teardown

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tower::BoxError;

use super::adapter::{adapt_routes_with, AdaptedRoutes};
use super::upgrade::{adapt_upgrade_routes_with, UpgradeAdapter, UpgradeRoutes};
use super::Routes;
use crate::entry::EntryPoint;
use crate::kernel::HeaderFilter;
use crate::span::SpanHandle;

/// Teardown action paired with an acquired value. Runs against an ambient
/// span, like the acquisition that produced it.
pub type TeardownFn = Box<dyn FnOnce(SpanHandle) -> BoxFuture<'static, ()> + Send>;

type AcquireFn<T> =
    Box<dyn FnOnce(SpanHandle) -> BoxFuture<'static, Result<(T, TeardownFn), BoxError>> + Send>;

/// A long-lived value whose acquire and release actions are context-bound:
/// both expect an ambient span, the way request handlers do.
pub struct TracedResource<T> {
    acquire: AcquireFn<T>,
}

impl<T> TracedResource<T> {
    pub fn new<F, Fut>(acquire: F) -> Self
    where
        F: FnOnce(SpanHandle) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(T, TeardownFn), BoxError>> + Send + 'static,
    {
        Self {
            acquire: Box::new(move |span| Box::pin(acquire(span))),
        }
    }

    /// Run the acquisition under the given span.
    pub async fn acquire(self, span: SpanHandle) -> Result<(T, TeardownFn), BoxError> {
        (self.acquire)(span).await
    }
}

/// An acquired value with its pending teardown.
pub struct Acquired<T> {
    value: T,
    teardown: Option<Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>>,
}

impl<T> std::fmt::Debug for Acquired<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acquired")
            .field("teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> Acquired<T> {
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Run the teardown. Consumes the value; teardown runs at most once.
    pub async fn release(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown().await;
        }
    }
}

impl<T> Drop for Acquired<T> {
    fn drop(&mut self) {
        if self.teardown.is_some() {
            tracing::warn!("acquired routes dropped without release; teardown skipped");
        }
    }
}

/// Resource-scoped [`adapt_routes`](super::adapt_routes): acquire the
/// routes under a noop span, adapt the produced value, and keep the
/// teardown runnable outside any request trace.
pub async fn adapt_resource_routes<R>(
    entry: Arc<dyn EntryPoint>,
    resource: TracedResource<R>,
) -> Result<Acquired<AdaptedRoutes<R>>, BoxError>
where
    R: Routes<SpanHandle>,
{
    adapt_resource_routes_with(entry, resource, HeaderFilter::default()).await
}

/// [`adapt_resource_routes`] with a caller-supplied kernel filter.
pub async fn adapt_resource_routes_with<R>(
    entry: Arc<dyn EntryPoint>,
    resource: TracedResource<R>,
    filter: HeaderFilter,
) -> Result<Acquired<AdaptedRoutes<R>>, BoxError>
where
    R: Routes<SpanHandle>,
{
    let (routes, teardown) = resource.acquire(SpanHandle::noop()).await?;
    Ok(Acquired {
        value: adapt_routes_with(entry, routes, filter),
        teardown: Some(Box::new(move || teardown(SpanHandle::noop()))),
    })
}

/// Resource-scoped [`adapt_upgrade_routes`](super::adapt_upgrade_routes).
pub async fn adapt_resource_upgrade_routes<R>(
    entry: Arc<dyn EntryPoint>,
    resource: TracedResource<R>,
) -> Result<Acquired<AdaptedRoutes<UpgradeAdapter<R>>>, BoxError>
where
    R: UpgradeRoutes<SpanHandle>,
{
    adapt_resource_upgrade_routes_with(entry, resource, HeaderFilter::default()).await
}

/// [`adapt_resource_upgrade_routes`] with a caller-supplied kernel filter.
pub async fn adapt_resource_upgrade_routes_with<R>(
    entry: Arc<dyn EntryPoint>,
    resource: TracedResource<R>,
    filter: HeaderFilter,
) -> Result<Acquired<AdaptedRoutes<UpgradeAdapter<R>>>, BoxError>
where
    R: UpgradeRoutes<SpanHandle>,
{
    let (factory, teardown) = resource.acquire(SpanHandle::noop()).await?;
    Ok(Acquired {
        value: adapt_upgrade_routes_with(entry, factory, filter),
        teardown: Some(Box::new(move || teardown(SpanHandle::noop()))),
    })
}
