//! Local stand-in for a Kuboard panel.
//!
//! Serves the three endpoints [`HttpKuboard`](crate::HttpKuboard) talks to,
//! answering from a per-route queue of canned responses and recording every
//! request it sees. Routes with an empty queue answer 500.

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{ACCEPT, CONTENT_TYPE, COOKIE},
        HeaderMap, StatusCode, Uri,
    },
    routing::{post, MethodRouter},
    Router,
};
use kb_config::{ClusterSite, Credentials};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const NAMESPACES: &str = "namespaces";
pub const VIEWER: &str = "viewer";
pub const ROLEBINDINGS: &str = "rolebindings";

/// One request as the panel received it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub route: &'static str,
    pub path: String,
    pub cookie: Option<String>,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct Stub {
    responses: Arc<Mutex<HashMap<&'static str, VecDeque<(u16, String)>>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn header(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl Stub {
    /// Queue a response for `route`. Queued responses are served in order.
    pub fn respond(&self, route: &'static str, status: u16, body: &str) -> &Self {
        lock(&self.responses)
            .entry(route)
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    pub fn seen(&self) -> Vec<Seen> {
        lock(&self.seen).clone()
    }

    pub fn hits(&self, route: &str) -> usize {
        self.seen().iter().filter(|s| s.route == route).count()
    }

    fn answer(
        &self,
        route: &'static str,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, String) {
        lock(&self.seen).push(Seen {
            route,
            path: uri.path().to_string(),
            cookie: header(&headers, COOKIE),
            accept: header(&headers, ACCEPT),
            content_type: header(&headers, CONTENT_TYPE),
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });
        let (status, text) = lock(&self.responses)
            .get_mut(route)
            .and_then(VecDeque::pop_front)
            .unwrap_or((500, "no canned response".to_string()));
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            text,
        )
    }
}

fn route(name: &'static str) -> MethodRouter<Stub> {
    post(
        move |State(stub): State<Stub>, uri: Uri, headers: HeaderMap, body: Bytes| async move {
            stub.answer(name, uri, headers, body)
        },
    )
}

/// Start the stub on an ephemeral loopback port.
pub async fn start() -> io::Result<(Stub, SocketAddr)> {
    let stub = Stub::default();
    let app = Router::new()
        .route("/k8s-api/{cluster}/api/v1/namespaces", route(NAMESPACES))
        .route(
            "/kuboard-api/cluster/{cluster}/kind/KuboardAuthClusterRoleBinding",
            route(VIEWER),
        )
        .route(
            "/k8s-api/{cluster}/apis/rbac.authorization.k8s.io/v1/namespaces/{namespace}/rolebindings",
            route(ROLEBINDINGS),
        )
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((stub, addr))
}

/// Site `s1` pointing at `addr` with admin/ak/sk credentials.
pub fn site_for(addr: SocketAddr) -> ClusterSite {
    ClusterSite {
        name: "s1".into(),
        base_url: format!("http://{addr}"),
        credentials: Credentials {
            username: "admin".into(),
            access_key: "ak".into(),
            secret_key: "sk".into(),
        },
    }
}

/// An address nothing listens on.
pub async fn dead_addr() -> io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    listener.local_addr()
}
