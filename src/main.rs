//! `ackd` binary: serves `POST /api/list` on port 3000.
//!
//! Run with:
//!   RUST_LOG=ackd=debug cargo run
//!
//! Try:
//!   curl -X POST http://localhost:3000/api/list \
//!        -H 'content-type: application/json' -d '{}'

use std::process::ExitCode;
use std::sync::Arc;

use ackd::config::{self, Config};
use ackd::{App, Server, api, body, middleware};
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::default();

    let app = App::new(api::routes(Arc::new(api::TracingHeaderLog)))
        .with(middleware::trace())
        .with(body::parser(config.limits));

    let server = match Server::bind(config.addr).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "could not start server");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.serve(app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
