//! Per-request logging.

use std::time::Instant;

use tracing::info;

use super::{Middleware, Next};
use crate::request::Request;

/// Emits one event per request with method, path, status and latency.
///
/// Register it first so the latency covers every other stage.
pub fn trace() -> impl Middleware {
    |req: Request, next: Next| async move {
        let method = req.method().clone();
        let path = req.path().to_owned();
        let start = Instant::now();

        let res = next.run(req).await;

        info!(
            %method,
            %path,
            status = res.status_code().as_u16(),
            latency = ?start.elapsed(),
            "request",
        );
        res
    }
}
