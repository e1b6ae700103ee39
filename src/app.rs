//! Application: the composition root.

use std::future::Future;
use std::sync::Arc;

use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// An ordered middleware stack in front of a [`Router`].
///
/// Built once at startup and immutable afterwards; the server shares it
/// between connections behind an `Arc`.
///
/// ```rust
/// use ackd::{App, Router, body, middleware};
///
/// let app = App::new(Router::new())
///     .with(middleware::trace())
///     .with(body::parser(body::Limits::default()));
/// ```
pub struct App {
    stack: Arc<[BoxedMiddleware]>,
    router: Arc<Router>,
}

impl App {
    pub fn new(router: Router) -> Self {
        Self { stack: Arc::from(Vec::new()), router: Arc::new(router) }
    }

    /// Appends a stage. Earlier stages wrap later ones.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        let mut stack = self.stack.to_vec();
        stack.push(middleware.into_boxed_middleware());
        self.stack = stack.into();
        self
    }

    /// Runs one request through the whole pipeline.
    pub fn handle(&self, req: Request) -> impl Future<Output = Response> + Send + 'static {
        Next::new(Arc::clone(&self.stack), Arc::clone(&self.router)).run(req)
    }
}
