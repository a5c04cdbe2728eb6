//! Tower bridge for adapted routes.
//!
//! # Responsibilities
//! - Mount bare routes on a tower/axum host without further glue
//! - Map "no route matched" to the host-facing 404 response
//!
//! # Design Decisions
//! - Handler errors keep flowing as `BoxError`; the host picks its own
//!   error boundary rather than getting a baked-in 500

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use tower::{BoxError, Service};

use super::Routes;

/// `tower::Service` over bare routes.
pub struct RouteService<R> {
    routes: Arc<R>,
}

impl<R> RouteService<R>
where
    R: Routes<()>,
{
    pub fn new(routes: R) -> Self {
        Self {
            routes: Arc::new(routes),
        }
    }
}

impl<R> Clone for RouteService<R> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
        }
    }
}

impl<R> Service<Request<Body>> for RouteService<R>
where
    R: Routes<()>,
{
    type Response = Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Response, BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), BoxError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let routes = self.routes.clone();
        Box::pin(async move {
            match routes.call((), req).await? {
                Some(response) => Ok(response),
                None => Ok((StatusCode::NOT_FOUND, "No matching route found").into_response()),
            }
        })
    }
}
