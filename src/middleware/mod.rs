//! Middleware layer.
//!
//! Middleware wraps everything registered after it. A stage receives the
//! request and a [`Next`]; awaiting `next.run(req)` runs the rest of the
//! pipeline (ending in the router) and yields its response:
//!
//! ```text
//!   ┌ trace ──────────────────────────────┐
//!   │   ┌ body parser ───────────────────┐ │
//!   │   │        Router → handler        │ │
//!   │   └────────────────────────────────┘ │
//!   └──────────────────────────────────────┘
//! ```
//!
//! Stages run in registration order on the way in and in reverse on the way
//! out. A stage that returns without calling `next` short-circuits the rest.
//!
//! ```rust
//! use ackd::{Request, Response, Status, middleware::Next};
//!
//! async fn require_token(req: Request, next: Next) -> Response {
//!     if req.header("x-token").is_none() {
//!         return Response::status(Status::Unauthorized);
//!     }
//!     next.run(req).await
//! }
//! ```

mod trace;

use std::future::Future;
use std::sync::Arc;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;

pub use trace::trace;

#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Implemented for every valid middleware stage.
///
/// Automatically satisfied for any `async fn` or closure with the shape
/// `Fn(Request, Next) -> impl Future<Output = impl IntoResponse>`.
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// The remainder of the pipeline after the current stage.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    router: Arc<Router>,
    index: usize,
}

impl Next {
    pub(crate) fn new(stack: Arc<[BoxedMiddleware]>, router: Arc<Router>) -> Self {
        Self { stack, router, index: 0 }
    }

    /// Runs the next stage, or the router once every stage has been entered.
    pub async fn run(mut self, req: Request) -> Response {
        match self.stack.get(self.index).cloned() {
            Some(stage) => {
                self.index += 1;
                stage.call(req, self).await
            }
            None => self.router.dispatch(req).await,
        }
    }
}
