//! In-process mock of the private API for network tests

use crate::config::ScraperConfig;
use crate::credentials::Credentials;
use crate::rate_limited_fetcher::RateLimitedFetcher;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub const TEST_TOKEN: &str = "MTIzNDU2.Gx7kQp.c2VjcmV0LXBhcnQ";

/// What the mock answers for one request
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    /// 429 with `{"retry_after": secs}`, or an empty body when `None`
    RateLimited(Option<f64>),
    /// 429 with only a `Retry-After` header
    RetryAfterHeader(&'static str),
    Status(u16),
    Raw(u16, &'static str),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub at: Instant,
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<String, VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

/// Replies are scripted per path. The last reply of a script repeats;
/// unscripted paths answer 404.
#[derive(Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<Inner>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, path: &str, replies: Vec<Reply>) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .scripts
            .insert(path.to_string(), replies.into());
        self
    }

    pub fn channels(&self, reply: Reply) -> &Self {
        self.script("/users/@me/channels", vec![reply])
    }

    pub fn profile(&self, user_id: &str, replies: Vec<Reply>) -> &Self {
        self.script(&format!("/users/{user_id}/profile"), replies)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    fn next_reply(&self, path: &str) -> Option<Reply> {
        let mut inner = self.inner.lock().unwrap();
        let script = inner.scripts.get_mut(path)?;
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }

    /// Serve on an ephemeral port and return the base URL
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn handle(State(api): State<MockApi>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().to_string();
    api.inner.lock().unwrap().requests.push(RecordedRequest {
        path: path.clone(),
        query: uri.query().map(String::from),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        at: Instant::now(),
    });

    match api.next_reply(&path) {
        Some(Reply::Json(body)) => Json(body).into_response(),
        Some(Reply::RateLimited(Some(secs))) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "message": "You are being rate limited.", "retry_after": secs })),
        )
            .into_response(),
        Some(Reply::RateLimited(None)) => StatusCode::TOO_MANY_REQUESTS.into_response(),
        Some(Reply::RetryAfterHeader(value)) => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, value)],
        )
            .into_response(),
        Some(Reply::Status(code)) => StatusCode::from_u16(code).unwrap().into_response(),
        Some(Reply::Raw(code, body)) => (StatusCode::from_u16(code).unwrap(), body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Config pointed at `api_base` with waits short enough for tests
pub fn test_config(api_base: &str) -> ScraperConfig {
    ScraperConfig {
        api_base: api_base.to_string(),
        fallback_retry_secs: 0.01..0.02,
        cooldown_secs: 0.0..0.0,
        ..ScraperConfig::default()
    }
}

pub fn test_fetcher(config: ScraperConfig) -> RateLimitedFetcher {
    let credentials = Credentials::parse(TEST_TOKEN).unwrap();
    RateLimitedFetcher::new(config, &credentials).unwrap()
}

pub fn recipient(id: &str, username: &str) -> Value {
    json!({ "id": id, "username": username, "global_name": null })
}

pub fn profile_body(id: &str, username: &str) -> Value {
    json!({
        "user": { "id": id, "username": username, "global_name": format!("{username} Display") },
        "user_profile": { "pronouns": "they/them" },
        "mutual_friends": [],
        "mutual_guilds": [],
        "connected_accounts": [],
        "premium_type": 2,
        "premium_since": "2021-05-04T12:30:15.123000+00:00"
    })
}
