#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use celeris_offline::application::ports::HttpTransport;
use celeris_offline::domain::entities::offline::{HttpRequest, HttpResponse};
use celeris_offline::domain::HttpMethod;
use celeris_offline::infrastructure::database::ConnectionPool;
use celeris_offline::shared::{AppConfig, AppError};
use celeris_offline::AppState;
use serde_json::{json, Value};

pub const BASE_URL: &str = "https://api.example.com";

/// Stand-in for the REST backend. Creates echo the body with a fresh numeric id
/// unless a fixed one is scripted; any path can be scripted to answer with a status.
#[derive(Default)]
pub struct MockBackend {
    unreachable: AtomicBool,
    next_id: AtomicUsize,
    fixed_ids: Mutex<Vec<String>>,
    statuses: Mutex<HashMap<String, u16>>,
    sent: Mutex<Vec<(HttpMethod, String, Option<String>)>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicUsize::new(100),
            ..Self::default()
        })
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Ids handed out by subsequent creates, in order.
    pub fn queue_ids(&self, ids: &[&str]) {
        let mut fixed = self.fixed_ids.lock().expect("ids lock");
        fixed.extend(ids.iter().map(|id| id.to_string()));
    }

    pub fn respond_with(&self, path: &str, status: u16) {
        self.statuses
            .lock()
            .expect("status lock")
            .insert(path.to_string(), status);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("delay lock") = Some(delay);
    }

    pub fn sent(&self) -> Vec<(HttpMethod, String, Option<String>)> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub fn sent_paths(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|(method, url, _)| format!("{method} {}", url.trim_start_matches(BASE_URL)))
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_server_id(&self) -> String {
        let mut fixed = self.fixed_ids.lock().expect("ids lock");
        if fixed.is_empty() {
            self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
        } else {
            fixed.remove(0)
        }
    }
}

#[async_trait]
impl HttpTransport for MockBackend {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection refused".into()));
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let delay = *self.delay.lock().expect("delay lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let url = request.url.as_str().to_string();
        self.sent
            .lock()
            .expect("sent lock")
            .push((request.method, url.clone(), request.body.clone()));

        let path = request.url.path().to_string();
        let scripted = self.statuses.lock().expect("status lock").get(&path).copied();
        if let Some(status) = scripted {
            return Ok(HttpResponse::new(status, r#"{"error":"scripted"}"#));
        }

        match request.method {
            HttpMethod::Post => {
                let mut body: Value = request
                    .body
                    .as_deref()
                    .and_then(|b| serde_json::from_str(b).ok())
                    .unwrap_or_else(|| json!({}));
                body["id"] = Value::String(self.next_server_id());
                Ok(HttpResponse::new(201, body.to_string()))
            }
            HttpMethod::Put => Ok(HttpResponse::new(
                200,
                request.body.clone().unwrap_or_default(),
            )),
            HttpMethod::Delete => Ok(HttpResponse::new(204, "")),
            HttpMethod::Get => Ok(HttpResponse::new(200, "[]")),
        }
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.api.base_url = BASE_URL.to_string();
    config
}

pub async fn memory_pool() -> ConnectionPool {
    let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
    pool.migrate().await.expect("migrations");
    pool
}

/// Fully wired state over an in-memory database and the mock backend, starting offline.
pub async fn offline_state() -> (AppState, Arc<MockBackend>) {
    let backend = MockBackend::new();
    let state = AppState::assemble(test_config(), memory_pool().await, backend.clone(), false)
        .await
        .expect("app state");
    (state, backend)
}

/// Polls `check` until it holds or a second has passed.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
