#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use homebar_client::{Client, ClientConfig, HttpTransport, NoToken, TokenStore};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One request as seen by a test node.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Seen {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[derive(Clone, Copy)]
pub enum Role {
    /// Answers every API call with 200 and a JSON echo; `/health` is 200.
    Leader,
    /// Answers every API call with a 307 to `target` + original path.
    Follower,
    /// Answers every API call with the given status and `{"error": ...}`.
    Failing(u16),
    /// Sleeps before answering like a leader.
    Slow(u64),
}

#[derive(Clone)]
struct NodeState {
    role: Role,
    target: Arc<Mutex<String>>,
    seen: Arc<Mutex<Vec<Seen>>>,
    reply: Arc<Mutex<Value>>,
}

/// A loopback backend node.
pub struct TestNode {
    pub origin: String,
    state: NodeState,
    handle: JoinHandle<()>,
}

impl TestNode {
    pub async fn start(role: Role) -> Self {
        let state = NodeState {
            role,
            target: Arc::new(Mutex::new(String::new())),
            seen: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Mutex::new(json!({ "ok": true }))),
        };

        let router = Router::new()
            .route("/health", get(|| async { "ok" }))
            .fallback(handle)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            origin,
            state,
            handle,
        }
    }

    pub async fn leader() -> Self {
        Self::start(Role::Leader).await
    }

    pub async fn follower_of(leader: &str) -> Self {
        let node = Self::start(Role::Follower).await;
        node.redirect_to(leader);
        node
    }

    pub fn redirect_to(&self, origin: &str) {
        *self.state.target.lock().unwrap() = origin.to_string();
    }

    pub fn reply_with(&self, body: Value) {
        *self.state.reply.lock().unwrap() = body;
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.state.seen.lock().unwrap().len()
    }

    /// Stop accepting connections.
    pub async fn kill(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

async fn handle(
    State(state): State<NodeState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let uri = uri.to_string();
    state.seen.lock().unwrap().push(Seen {
        method,
        uri: uri.clone(),
        headers,
        body,
    });

    match state.role {
        Role::Leader => Json(state.reply.lock().unwrap().clone()).into_response(),
        Role::Slow(millis) => {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Json(state.reply.lock().unwrap().clone()).into_response()
        }
        Role::Follower => {
            let target = format!("{}{}", state.target.lock().unwrap(), uri);
            Redirect::temporary(&target).into_response()
        }
        Role::Failing(status) => {
            let status = StatusCode::from_u16(status).unwrap();
            (status, Json(json!({ "error": "leader unknown" }))).into_response()
        }
    }
}

/// An origin nothing listens on.
pub async fn dead_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Client that opens a fresh connection per attempt, so killed nodes fail fast.
pub fn client(origins: &[&str]) -> Client {
    client_with(ClientConfig::new(origins.iter().copied()), Arc::new(NoToken))
}

pub fn client_with(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Client {
    let mut builder = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    let transport = Arc::new(HttpTransport::with_client(builder.build().unwrap()));
    Client::with_transport(config, transport, tokens).unwrap()
}
