//! Request-boundary adaptation: kernel extraction, span acquisition, and
//! guaranteed release.
//!
//! # Responsibilities
//! - Wrap context-bound routes into bare routes the host can mount
//! - Extract the propagation kernel before every span acquisition
//! - Keep the span open until the response body is fully produced
//!
//! # Data Flow
//! ```text
//! request
//!     → Kernel::from_headers (filter, default = redaction policy)
//!     → EntryPoint::continue_or_root (SpanGuard, named after the path)
//!     → routes.call(span, request)
//!     → Some(response): guard rides inside SpanBody until end-of-body
//!       None / Err:     guard drops here, before the caller observes it
//! ```
//!
//! # Design Decisions
//! - Extraction precedes acquisition precedes invocation precedes release,
//!   on every path including errors and cancellation
//! - Unmatched requests still open and close exactly one span
//! - The adapter never transforms handler outcomes or errors

use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body::{Body as HttpBody, Frame, SizeHint};
use pin_project_lite::pin_project;

use super::{lower, RouteFuture, Routes};
use crate::entry::EntryPoint;
use crate::kernel::{HeaderFilter, Kernel};
use crate::span::{SpanGuard, SpanHandle};

/// Adapt context-bound routes with the default redaction filter.
pub fn adapt_routes<R>(entry: Arc<dyn EntryPoint>, routes: R) -> AdaptedRoutes<R>
where
    R: Routes<SpanHandle>,
{
    adapt_routes_with(entry, routes, HeaderFilter::default())
}

/// Adapt context-bound routes with a caller-supplied kernel filter.
pub fn adapt_routes_with<R>(
    entry: Arc<dyn EntryPoint>,
    routes: R,
    filter: HeaderFilter,
) -> AdaptedRoutes<R>
where
    R: Routes<SpanHandle>,
{
    AdaptedRoutes {
        entry,
        routes: Arc::new(routes),
        filter,
    }
}

/// Bare routes produced by [`adapt_routes`]: no trace-context dependency
/// remains in their type.
pub struct AdaptedRoutes<R> {
    entry: Arc<dyn EntryPoint>,
    routes: Arc<R>,
    filter: HeaderFilter,
}

impl<R> Clone for AdaptedRoutes<R> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            routes: self.routes.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<R> Routes<()> for AdaptedRoutes<R>
where
    R: Routes<SpanHandle>,
{
    fn call(&self, _cx: (), req: Request<Body>) -> RouteFuture {
        let entry = self.entry.clone();
        let routes = self.routes.clone();
        let filter = self.filter.clone();
        Box::pin(async move {
            let kernel = Kernel::from_headers(req.headers(), &filter);
            let route = req.uri().path().to_string();
            tracing::debug!(route = %route, kernel_headers = kernel.len(), "adapting request");

            let guard = entry.continue_or_root(&route, &kernel);

            // The guard stays on this stack frame across the await: if the
            // request future is dropped mid-flight, the span still closes.
            match lower(guard.handle(), routes).call((), req).await? {
                Some(response) => Ok(Some(defer_release(response, guard))),
                None => Ok(None),
            }
        })
    }
}

/// Move the guard into the response body so the span closes only once the
/// body is fully produced.
fn defer_release(response: Response, guard: SpanGuard) -> Response {
    response.map(|body| {
        Body::new(SpanBody {
            inner: body,
            guard: Some(guard),
        })
    })
}

pin_project! {
    /// Response body that holds the request's span open until end-of-body.
    ///
    /// Nested trace calls may still happen while the response is drained or
    /// transformed downstream, so release waits for end-of-stream, an error
    /// frame, or the body being dropped.
    struct SpanBody<B> {
        #[pin]
        inner: B,
        guard: Option<SpanGuard>,
    }
}

impl<B> HttpBody for SpanBody<B>
where
    B: HttpBody,
{
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        let frame = ready!(this.inner.poll_frame(cx));
        match &frame {
            None | Some(Err(_)) => {
                // Terminal frame: release now rather than waiting for the
                // caller to drop the body.
                this.guard.take();
            }
            Some(Ok(_)) => {}
        }
        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
