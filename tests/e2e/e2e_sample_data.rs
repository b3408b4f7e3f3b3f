use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use bytes::Bytes;
use kibana_sample_data::{
    Client, RestErrorKind, RestRequest, SampleDataLoader, SampleDataOutcome, SampleDataTarget,
};
use tokio::net::TcpListener;
use tokio::time::sleep;

#[derive(Clone, Debug, Default)]
struct SeenRequest {
    authorization: Option<String>,
    xsrf: Option<String>,
    content_type: Option<String>,
    body_len: usize,
}

#[derive(Clone, Default)]
struct AppState {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

#[tokio::test]
async fn e2e_sample_data_success_with_basic_auth() {
    let server = TestServer::start().await;
    let loader = SampleDataLoader::new(Client::new());
    let target = SampleDataTarget::new(server.base_url.clone(), "elastic", "default");

    let mut out = Vec::new();
    let outcome = loader
        .run(&target, &mut out)
        .await
        .expect("loopback server should answer");

    assert!(outcome.is_loaded());
    assert_eq!(out, b"Sample data added successfully!\n");

    let seen = server.seen();
    assert_eq!(seen.len(), 1);
    // base64("elastic:default")
    assert_eq!(
        seen[0].authorization.as_deref(),
        Some("Basic ZWxhc3RpYzpkZWZhdWx0")
    );
    assert_eq!(seen[0].xsrf.as_deref(), Some("true"));
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(seen[0].body_len, 0);
}

#[tokio::test]
async fn e2e_wrong_credentials_report_unauthorized() {
    let server = TestServer::start().await;
    let loader = SampleDataLoader::new(Client::new());
    let target = SampleDataTarget::new(server.base_url.clone(), "elastic", "wrong");

    let outcome = loader.load(&target).await.expect("401 is still a response");

    assert_eq!(
        outcome,
        SampleDataOutcome::Failed {
            status: 401,
            body: "Unauthorized".to_string()
        }
    );
}

#[tokio::test]
async fn e2e_refused_connection_is_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let loader = SampleDataLoader::new(Client::new());
    let target = SampleDataTarget::new(format!("http://{addr}"), "elastic", "default");

    let err = loader
        .load(&target)
        .await
        .expect_err("nothing listens on the port");
    assert_eq!(err.kind(), RestErrorKind::Connect);
}

#[tokio::test]
async fn e2e_explicit_timeout_is_timeout_error() {
    let server = TestServer::start().await;
    let client = Client::new();

    let err = client
        .execute(RestRequest::post(server.url("/slow")).with_timeout(Duration::from_millis(200)))
        .await
        .expect_err("explicit timeout should trigger");

    assert_eq!(err.kind(), RestErrorKind::Timeout);
}

struct TestServer {
    base_url: String,
    state: AppState,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::default();
        let app = Router::new()
            .route("/api/sample_data/logs", post(sample_data_handler))
            .route("/slow", post(slow_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().expect("seen mutex").clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn sample_data_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let seen = SeenRequest {
        authorization: header(&headers, "authorization"),
        xsrf: header(&headers, "kbn-xsrf"),
        content_type: header(&headers, "content-type"),
        body_len: body.len(),
    };
    let authorized = seen.authorization.as_deref() == Some("Basic ZWxhc3RpYzpkZWZhdWx0");
    state.seen.lock().expect("seen mutex").push(seen);

    if authorized {
        (
            StatusCode::OK,
            r#"{"elasticsearchIndicesCreated":{"kibana_sample_data_logs":14074},"kibanaSavedObjectsLoaded":11}"#,
        )
    } else {
        (StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

async fn slow_handler() -> (StatusCode, &'static str) {
    sleep(Duration::from_millis(2500)).await;
    (StatusCode::OK, "{}")
}
