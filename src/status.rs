//! HTTP status codes the framework produces, as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use ackd::{Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! async fn forbidden(_req: ackd::Request) -> Status {
//!     Status::Unauthorized
//! }
//! ```

use http::StatusCode;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    Created,             // 201
    NoContent,           // 204

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    Unauthorized,        // 401
    NotFound,            // 404
    MethodNotAllowed,    // 405
    ContentTooLarge,     // 413

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
    NotImplemented,      // 501
}

impl From<Status> for StatusCode {
    fn from(s: Status) -> StatusCode {
        match s {
            Status::Ok                  => StatusCode::OK,
            Status::Created             => StatusCode::CREATED,
            Status::NoContent           => StatusCode::NO_CONTENT,
            Status::BadRequest          => StatusCode::BAD_REQUEST,
            Status::Unauthorized        => StatusCode::UNAUTHORIZED,
            Status::NotFound            => StatusCode::NOT_FOUND,
            Status::MethodNotAllowed    => StatusCode::METHOD_NOT_ALLOWED,
            Status::ContentTooLarge     => StatusCode::PAYLOAD_TOO_LARGE,
            Status::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Status::NotImplemented      => StatusCode::NOT_IMPLEMENTED,
        }
    }
}
