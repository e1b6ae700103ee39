//! HTTP server and graceful shutdown.
//!
//! [`Server::bind`] claims the socket up front, so a port that is already in
//! use surfaces as an [`Error::Bind`] before anything else happens. The
//! caller decides what to do with it; the `ackd` binary logs it and exits.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Stops calling `listener.accept()`.
//! 2. Asks every open connection to close once its current request is done;
//!    idle keep-alive connections close right away.
//! 3. Returns from [`Server::serve`].

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::app::App;
use crate::error::Error;
use crate::request::Request;

/// A bound, not yet serving, HTTP server.
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
}

impl Server {
    /// Binds a TCP listener on `addr`. Fails immediately, without retrying,
    /// if the address cannot be bound.
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), ackd::Error> {
    /// let server = ackd::Server::bind("0.0.0.0:3000".parse().unwrap()).await?;
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    /// The address actually bound (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves `app` until SIGTERM or Ctrl-C, then drains in-flight requests.
    pub async fn serve(self, app: App) -> Result<(), Error> {
        self.serve_with_shutdown(app, shutdown_signal()).await
    }

    /// Serves `app` until `signal` resolves, then drains in-flight requests.
    pub async fn serve_with_shutdown(
        self,
        app: App,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let Self { listener, addr } = self;
        let app = Arc::new(app);

        // Logged before the first accept.
        info!(%addr, "server started: {}", addr.port());

        let mut tasks = tokio::task::JoinSet::new();
        // Tells open connections to finish their current request and close.
        let (drain, _) = watch::channel(());
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let mut draining = drain.subscribe();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| dispatch(Arc::clone(&app), req));

                        let builder = ConnBuilder::new(TokioExecutor::new());
                        let conn = builder.serve_connection(io, svc);
                        tokio::pin!(conn);

                        let res = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = draining.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.await
                            }
                        };
                        // Malformed requests are answered by hyper itself.
                        if let Err(e) = res {
                            debug!(%peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        let _ = drain.send(());
        while tasks.join_next().await.is_some() {}

        info!("server stopped");
        Ok(())
    }
}

/// Runs one request through the app. Every failure has already become a
/// response by this point, so hyper never sees an error.
async fn dispatch(
    app: Arc<App>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let response = app.handle(Request::from_http(req)).await;
    Ok(response.into_http())
}

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C) the process receives.
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
