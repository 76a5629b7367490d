//! In-process mock backend for tests.
//!
//! Serves an axum router on an ephemeral port and records every request it
//! sees, so tests can assert on what the client actually sent.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::{Json, Router};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

pub struct MockBackend {
    base_url: String,
    log: RequestLog,
    session: Arc<SessionStore>,
}

impl MockBackend {
    pub async fn start(router: Router) -> Self {
        let log: RequestLog = Arc::default();
        let app = router.layer(middleware::from_fn_with_state(log.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            log,
            session: Arc::new(SessionStore::in_memory()),
        }
    }

    /// A client pointed at this backend, sharing one session store
    pub fn client(&self) -> ApiClient {
        let config = ApiConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
        };
        ApiClient::new(&config, self.session.clone()).unwrap()
    }

    pub fn session(&self) -> Arc<SessionStore> {
        self.session.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().len()
    }

    /// Number of requests received for `method path`
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    log.lock().push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization,
    });

    next.run(request).await
}

/// A route answering `filter` requests with a fixed status and JSON body
pub fn reply(filter: MethodFilter, status: StatusCode, body: serde_json::Value) -> MethodRouter {
    on(filter, move || {
        let body = body.clone();
        async move { (status, Json(body)) }
    })
}

pub fn reply_get(status: StatusCode, body: serde_json::Value) -> MethodRouter {
    reply(MethodFilter::GET, status, body)
}

pub fn reply_post(status: StatusCode, body: serde_json::Value) -> MethodRouter {
    reply(MethodFilter::POST, status, body)
}
