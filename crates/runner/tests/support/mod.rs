//! In-process mock of the project board API

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use apismoke::RunnerConfig;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use serde_json::{json, Value};

/// What the mock answers on the endpoints a test cares about
#[derive(Debug, Clone)]
pub struct Behavior {
    pub health_status: StatusCode,
    pub register_status: StatusCode,
    pub login_status: StatusCode,
    pub login_body: Value,
    pub project_body: Value,
    pub comment_body: Value,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            health_status: StatusCode::OK,
            register_status: StatusCode::CREATED,
            login_status: StatusCode::OK,
            login_body: json!({"token": "abc123", "user": {"id": 1}}),
            project_body: json!({"id": "p1", "title": "Test Project"}),
            comment_body: json!({"id": "c1", "content": "This is a test comment"}),
        }
    }
}

/// A request as the mock received it
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct Shared {
    behavior: Behavior,
    seen: Arc<Mutex<Vec<Seen>>>,
}

pub struct MockService {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockService {
    pub async fn start(behavior: Behavior) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = Shared {
            behavior,
            seen: seen.clone(),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            seen,
        }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.seen()
            .into_iter()
            .map(|s| format!("{} {}", s.method, s.path))
            .collect()
    }

    /// Runner config aimed at this mock with no pause between steps
    pub fn config(&self) -> RunnerConfig {
        fast_config(&self.base_url)
    }

    /// Runner config aimed at this mock with the given pause
    pub fn paced_config(&self, step_delay: Duration) -> RunnerConfig {
        RunnerConfig {
            step_delay,
            ..fast_config(&self.base_url)
        }
    }
}

pub fn fast_config(base_url: &str) -> RunnerConfig {
    RunnerConfig {
        step_delay: Duration::ZERO,
        request_timeout: Some(Duration::from_secs(5)),
        ..RunnerConfig::for_base_url(base_url)
    }
}

/// A base URL nothing listens on
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let path = uri.path().to_string();

    state.seen.lock().unwrap().push(Seen {
        method: method.to_string(),
        path: path.clone(),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).ok(),
    });

    let b = &state.behavior;
    let (status, reply) = match (method.as_str(), path.as_str()) {
        ("GET", "/health") => (b.health_status, json!({"status": "ok"})),
        ("POST", "/api/auth/register") => (b.register_status, json!({"user": {}, "token": "reg"})),
        ("POST", "/api/auth/login") => (b.login_status, b.login_body.clone()),
        ("GET", "/api/projects") => (StatusCode::OK, json!({"projects": []})),
        ("POST", "/api/projects") => (StatusCode::CREATED, b.project_body.clone()),
        ("POST", "/api/comments") => (StatusCode::CREATED, b.comment_body.clone()),
        ("GET", p) if p.starts_with("/api/comments/project/") => (StatusCode::OK, json!([])),
        ("GET" | "PUT" | "DELETE", p)
            if p.starts_with("/api/projects/") || p.starts_with("/api/comments/") =>
        {
            (StatusCode::OK, json!({"message": "ok"}))
        }
        _ => (StatusCode::NOT_FOUND, json!({"error": "not found"})),
    };

    (status, reply.to_string())
}
