//! # ackd
//!
//! A tiny HTTP service that acknowledges `POST /api/list` with
//! `{"code":0,"msg":"ok"}`, built on a minimal framework with onion-style
//! middleware.
//!
//! ## The pipeline
//!
//! ```text
//! TcpListener ─▶ hyper ─▶ App::handle
//!                           ├─ middleware::trace   in: registration order
//!                           ├─ body::parser        out: reverse order
//!                           └─ Router              404 / 405 / 501 when unmatched
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ackd::{App, Server, api, body, config::Config, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ackd::Error> {
//!     let config = Config::default();
//!     let app = App::new(api::routes(Arc::new(api::TracingHeaderLog)))
//!         .with(middleware::trace())
//!         .with(body::parser(config.limits));
//!
//!     Server::bind(config.addr).await?.serve(app).await
//! }
//! ```

mod app;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod body;
pub mod config;
pub mod middleware;

pub use app::App;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::{Body, BoxError, Request};
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
