//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is the
//! terminal stage of the middleware pipeline: when nothing matches it answers
//! the way an allowed-methods layer would.
//!
//! | Situation | Response |
//! |---|---|
//! | method + path registered | the handler's response |
//! | method outside [`Method`] | `501 Not Implemented` |
//! | path registered, `OPTIONS` | `200` with `Allow` |
//! | path registered, other method | `405` with `Allow` |
//! | path unknown | `404 Not Found` |

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use http::header::{ALLOW, HeaderValue};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application route table.
///
/// Build it once at startup and hand it to [`App::new`](crate::App::new).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: BTreeMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: BTreeMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or is already registered for
    /// `method`. Routes are fixed at startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Methods registered for `path`, in a stable order.
    fn allowed(&self, path: &str) -> Vec<Method> {
        self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| *method)
            .collect()
    }

    pub(crate) async fn dispatch(&self, mut req: Request) -> Response {
        let Ok(method) = Method::try_from(req.method()) else {
            debug!(method = %req.method(), "method not implemented");
            return Response::reason(Status::NotImplemented);
        };

        if let Some((handler, params)) = self.lookup(method, req.path()) {
            req.params = params;
            return handler.call(req).await;
        }

        let allowed = self.allowed(req.path());
        if allowed.is_empty() {
            return Response::reason(Status::NotFound);
        }

        let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
        // Method names are plain ASCII tokens.
        let allow = HeaderValue::from_str(&allow).unwrap_or_else(|_| HeaderValue::from_static(""));

        if method == Method::Options {
            return Response::builder().header(ALLOW, allow).no_body();
        }
        Response::builder()
            .status(Status::MethodNotAllowed)
            .header(ALLOW, allow)
            .text("Method Not Allowed")
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
