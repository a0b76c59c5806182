// In-process stand-in for the SuccessFactors OData endpoint
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::PlatformConfig;
use crate::service::TimeOffService;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct PlatformStub {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl PlatformStub {
    pub fn config(&self) -> PlatformConfig {
        let mut config = PlatformConfig::new(self.base_url.clone(), "test-key").unwrap();
        config.request_timeout = Duration::from_secs(5);
        config
    }

    pub fn service(&self) -> TimeOffService {
        TimeOffService::new(Arc::new(self.config())).unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        api_key: headers
            .get("apikey")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    (state.status, state.body.clone())
}

/// Serve `body` with `status` for every request under `http://127.0.0.1:<port>/odata/v2`.
pub async fn spawn_platform_stub(status: StatusCode, body: &str) -> PlatformStub {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status,
        body: body.to_string(),
        requests: requests.clone(),
    };
    let app = Router::new().fallback(record).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    PlatformStub {
        base_url: format!("http://{addr}/odata/v2"),
        requests,
    }
}

/// A service pointed at a port nothing listens on.
pub async fn unreachable_service() -> TimeOffService {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = PlatformConfig::new(format!("http://{addr}/odata/v2"), "test-key").unwrap();
    config.request_timeout = Duration::from_secs(2);
    TimeOffService::new(Arc::new(config)).unwrap()
}
