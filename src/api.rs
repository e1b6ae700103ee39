//! The `POST /api/list` endpoint.
//!
//! Whatever the body, the answer is always `200 {"code":0,"msg":"ok"}`. The
//! only side effect is handing the request headers to a [`HeaderLog`].

use std::sync::Arc;

use http::HeaderMap;
use serde::Serialize;
use tracing::debug;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Json;
use crate::router::Router;

pub const LIST_PATH: &str = "/api/list";

/// Acknowledgment body.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Ack {
    pub code: i32,
    pub msg: &'static str,
}

impl Ack {
    pub const OK: Self = Self { code: 0, msg: "ok" };
}

/// Where the list handler reports the headers it received.
///
/// The output is diagnostic only and carries no format guarantee.
pub trait HeaderLog: Send + Sync + 'static {
    fn headers(&self, headers: &HeaderMap);
}

/// Writes headers as a `debug`-level `tracing` event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHeaderLog;

impl HeaderLog for TracingHeaderLog {
    fn headers(&self, headers: &HeaderMap) {
        debug!(?headers, "request headers");
    }
}

/// Builds the `POST /api/list` handler around `log`.
pub fn list(log: Arc<dyn HeaderLog>) -> impl Handler {
    move |req: Request| {
        let log = Arc::clone(&log);
        async move {
            log.headers(req.headers());
            Json(Ack::OK)
        }
    }
}

/// The route table: `POST /api/list` and nothing else.
pub fn routes(log: Arc<dyn HeaderLog>) -> Router {
    Router::new().post(LIST_PATH, list(log))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use http::StatusCode;
    use http::header::{ALLOW, CONTENT_TYPE};

    use super::*;
    use crate::App;
    use crate::body::{self, Limits};
    use crate::request::{test_request, test_request_with};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<HeaderMap>>);

    impl HeaderLog for Recorder {
        fn headers(&self, headers: &HeaderMap) {
            self.0.lock().unwrap().push(headers.clone());
        }
    }

    fn app(log: Arc<dyn HeaderLog>) -> App {
        App::new(routes(log)).with(body::parser(Limits::default()))
    }

    #[tokio::test]
    async fn acknowledges_any_body() {
        let app = app(Arc::new(TracingHeaderLog));
        for (ct, body) in [
            (Some("application/json"), &br#"{}"#[..]),
            (Some("application/json"), &br#"{"page":3}"#[..]),
            (Some("application/x-www-form-urlencoded"), &b"a=1"[..]),
            (None, &b""[..]),
        ] {
            let res = app.handle(test_request("POST", LIST_PATH, ct, body)).await;
            assert_eq!(res.status_code(), StatusCode::OK);
            assert_eq!(res.body(), br#"{"code":0,"msg":"ok"}"#);
            assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        }
    }

    #[tokio::test]
    async fn logs_the_request_headers() {
        let recorder = Arc::new(Recorder::default());
        let app = app(recorder.clone());

        app.handle(test_request("POST", LIST_PATH, Some("application/json"), b"{}")).await;

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn malformed_json_never_reaches_the_handler() {
        let recorder = Arc::new(Recorder::default());
        let app = app(recorder.clone());

        let res = app.handle(test_request("POST", LIST_PATH, Some("application/json"), b"{")).await;

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn opaque_bodies_past_every_limit_are_acknowledged() {
        let app = app(Arc::new(TracingHeaderLog));
        let big = Bytes::from(vec![b'x'; 2 * 1024 * 1024]);

        let res = app
            .handle(test_request_with("POST", LIST_PATH, Some("application/octet-stream"), big))
            .await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), br#"{"code":0,"msg":"ok"}"#);
    }

    #[tokio::test]
    async fn large_get_is_still_method_not_allowed() {
        let app = app(Arc::new(TracingHeaderLog));
        let big = Bytes::from(vec![b'x'; 2 * 1024 * 1024]);

        let res = app.handle(test_request_with("GET", LIST_PATH, Some("application/json"), big)).await;

        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "POST");
    }
}
