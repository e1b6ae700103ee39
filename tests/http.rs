//! End-to-end tests: a real server on an ephemeral port, driven by reqwest.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use ackd::{App, Server, api, body, middleware};
use reqwest::StatusCode;
use reqwest::header::{ALLOW, CONTENT_TYPE};
use serde_json::{Value, json};
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<Result<(), ackd::Error>>,
}

impl TestServer {
    async fn start() -> Self {
        let app = App::new(api::routes(Arc::new(api::TracingHeaderLog)))
            .with(middleware::trace())
            .with(body::parser(body::Limits::default()));

        let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve_with_shutdown(app, async {
            let _ = rx.await;
        }));

        Self { addr, shutdown: Some(tx), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn post_list_with_empty_object_is_acknowledged() {
    let server = TestServer::start().await;

    let res = client()
        .post(server.url("/api/list"))
        .header(CONTENT_TYPE, "application/json")
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("application/json"));
    assert_eq!(res.text().await.unwrap(), r#"{"code":0,"msg":"ok"}"#);

    server.stop().await;
}

#[tokio::test]
async fn repeated_requests_get_identical_responses() {
    let server = TestServer::start().await;
    let client = client();

    for _ in 0..5 {
        let res = client.post(server.url("/api/list")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "code": 0, "msg": "ok" }));
    }

    server.stop().await;
}

#[tokio::test]
async fn get_list_is_method_not_allowed() {
    let server = TestServer::start().await;

    let res = client().get(server.url("/api/list")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[ALLOW], "POST");
    assert_ne!(res.text().await.unwrap(), r#"{"code":0,"msg":"ok"}"#);

    server.stop().await;
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = TestServer::start().await;

    let res = client().post(server.url("/unknown")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let server = TestServer::start().await;

    let res = client()
        .post(server.url("/api/list"))
        .header(CONTENT_TYPE, "application/json")
        .body("{\"code\":")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn form_and_opaque_bodies_are_acknowledged() {
    let server = TestServer::start().await;
    let client = client();

    for (ct, body) in [
        ("application/x-www-form-urlencoded", "page=1&size=20"),
        ("application/octet-stream", "\u{1}\u{2}\u{3}"),
    ] {
        let res = client
            .post(server.url("/api/list"))
            .header(CONTENT_TYPE, ct)
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text().await.unwrap(), r#"{"code":0,"msg":"ok"}"#);
    }

    server.stop().await;
}

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// `#[tokio::test]` runs on a current-thread runtime, so the thread-local
// subscriber also sees events from the spawned server task.
#[tokio::test]
async fn startup_line_is_logged_before_the_first_response() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = TestServer::start().await;
    let startup = format!("server started: {}", server.addr.port());

    let res = client().post(server.url("/api/list")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let out = logs.contents();
    let started_at = out.find(&startup).expect("startup line logged");
    let request_at = out.find("request method=POST").expect("request event logged");
    assert!(started_at < request_at, "startup line must come first:\n{out}");

    server.stop().await;
}
