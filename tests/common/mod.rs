//! Shared utilities for integration testing.

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use upgrade_servicelog::cluster::StaticClusterVersions;
use upgrade_servicelog::config::ServiceLogConfig;
use upgrade_servicelog::servicelog::client::CLUSTER_LOGS_PATH;
use upgrade_servicelog::ServiceLogClient;

pub const TEST_TOKEN: &str = "test-token";

/// A request received by the mock log service.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// Programmable stand-in for the cluster logs endpoint.
#[derive(Clone)]
pub struct MockLogService {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    status: Arc<AtomicU16>,
}

#[allow(dead_code)]
impl MockLogService {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a mock log service answering every submission with `status`.
pub async fn start_mock_log_service(status: u16) -> MockLogService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let service = MockLogService {
        addr,
        requests: Arc::new(Mutex::new(Vec::new())),
        status: Arc::new(AtomicU16::new(status)),
    };

    let app = Router::new()
        .route(CLUSTER_LOGS_PATH, post(create_cluster_log))
        .with_state(service.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    service
}

async fn create_cluster_log(
    State(service): State<MockLogService>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    service.requests.lock().unwrap().push(RecordedRequest {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    });

    let status = StatusCode::from_u16(service.status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body))
}

/// Build a client for `cluster_id` pointed at the mock service.
pub async fn client_for(service: &MockLogService, cluster_id: &str, service_name: &str) -> ServiceLogClient {
    let config = ServiceLogConfig {
        token: TEST_TOKEN.to_string(),
        api_url: service.url(),
        timeout_secs: 5,
    };
    ServiceLogClient::new(&StaticClusterVersions::single(cluster_id), service_name, config)
        .await
        .unwrap()
}
