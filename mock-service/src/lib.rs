use axum::{
    debug_handler,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::{self, BoxStream, StreamExt};
use metrics::counter;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, RwLock,
};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const EVENT_DELAY: Duration = Duration::from_millis(10);
const KEEP_ALIVE: Duration = Duration::from_millis(50);

/// State of one mock backend. Every instance starts empty.
#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    profiles: RwLock<HashMap<String, Value>>,
    results: RwLock<HashSet<String>>,
    run_queries: RwLock<Vec<String>>,
    active_streams: AtomicUsize,
    boards_unavailable: AtomicBool,
}

impl MockState {
    pub fn profile_count(&self) -> usize {
        self.inner.profiles.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Raw query strings of every run request received, in order.
    pub fn run_queries(&self) -> Vec<String> {
        self.inner
            .run_queries
            .read()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// Run streams the server is still writing to.
    pub fn active_streams(&self) -> usize {
        self.inner.active_streams.load(Ordering::SeqCst)
    }

    pub fn set_boards_available(&self, available: bool) {
        self.inner
            .boards_unavailable
            .store(!available, Ordering::SeqCst);
    }
}

/// A mock backend serving on a local port until dropped.
pub struct MockHandle {
    addr: SocketAddr,
    state: MockState,
    task: JoinHandle<()>,
}

impl MockHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serve a fresh backend on an ephemeral local port.
pub async fn spawn() -> anyhow::Result<MockHandle> {
    let state = MockState::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state.clone());

    let task = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("Mock service stopped: {err}");
        }
    });
    debug!("Mock service listening on {addr}");
    Ok(MockHandle { addr, state, task })
}

pub async fn run(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mock service listening on {addr}");
    axum::serve(listener, router(MockState::default())).await?;
    Ok(())
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route(
            "/api/user/performance/profiles",
            post(save_profile).get(list_profiles),
        )
        .route("/api/user/performance/profiles/:id", get(fetch_profile))
        .route("/api/user/performance/profiles/:id/run", get(run_profile))
        .route("/api/user/prefs", get(prefs))
        .route("/api/telemetry/metrics/static-board", get(static_board))
        .route("/api/mesh", get(meshes))
        .route("/api/system/graphql", post(graphql))
        .route("/api/perf/profile/result/:id", get(result))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Error, Debug)]
pub enum MockError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Rejected(String),

    #[error("No Kubernetes cluster is connected")]
    NoCluster,

    #[error("Mock state is poisoned")]
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for MockError {
    fn from(_err: std::sync::PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = match self {
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
            MockError::Rejected(_) => StatusCode::BAD_REQUEST,
            MockError::NoCluster | MockError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/** Profiles **/

/// Upsert keyed by `id`; a profile named `reject` is refused.
#[debug_handler]
async fn save_profile(
    State(state): State<MockState>,
    Json(mut profile): Json<Value>,
) -> Result<Json<Value>, MockError> {
    counter!("mock-service.requests", "route" => "save_profile").increment(1);

    if profile["name"] == "reject" {
        return Err(MockError::Rejected("profile name is not allowed".to_string()));
    }

    let id = match profile["id"].as_str() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    };
    profile["id"] = json!(id);
    profile["user_id"] = json!("mock-user");

    state
        .inner
        .profiles
        .write()?
        .insert(id.clone(), profile.clone());
    debug!("Saved profile {id}");
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_page_size")]
    pagesize: usize,
}

fn default_page_size() -> usize {
    10
}

async fn list_profiles(
    State(state): State<MockState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, MockError> {
    let profiles = state.inner.profiles.read()?;
    let mut all: Vec<_> = profiles.values().cloned().collect();
    all.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

    let page: Vec<_> = all
        .iter()
        .skip(query.page * query.pagesize)
        .take(query.pagesize)
        .cloned()
        .collect();
    Ok(Json(json!({
        "page": query.page,
        "page_size": query.pagesize,
        "total_count": all.len(),
        "profiles": page,
    })))
}

async fn fetch_profile(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, MockError> {
    let profile = state.inner.profiles.read()?.get(&id).cloned();
    profile
        .map(Json)
        .ok_or_else(|| MockError::NotFound(format!("profile {id}")))
}

/** Runs **/

/// How a run behaves, picked from the first label of the target host.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Script {
    Complete,
    Fail,
    Drop,
    Slow,
    Empty,
}

impl Script {
    fn for_target(target: &str) -> Self {
        let host = url::Url::parse(target)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();
        match host.split('.').next() {
            Some("fail") => Script::Fail,
            Some("drop") => Script::Drop,
            Some("slow") => Script::Slow,
            Some("empty") => Script::Empty,
            _ => Script::Complete,
        }
    }
}

struct StreamGuard(MockState);

impl StreamGuard {
    fn new(state: MockState) -> Self {
        state.inner.active_streams.fetch_add(1, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.inner.active_streams.fetch_sub(1, Ordering::SeqCst);
    }
}

#[debug_handler]
async fn run_profile(
    State(state): State<MockState>,
    Path(id): Path<String>,
    RawQuery(raw): RawQuery,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Sse<BoxStream<'static, Result<Event, Infallible>>>, MockError> {
    counter!("mock-service.requests", "route" => "run_profile").increment(1);

    if !state.inner.profiles.read()?.contains_key(&id) {
        return Err(MockError::NotFound(format!("profile {id}")));
    }
    state
        .inner
        .run_queries
        .write()?
        .push(raw.unwrap_or_default());

    let param = |key: &str| params.get(key).cloned().unwrap_or_default();
    let script = Script::for_target(&param("url"));
    info!("Running profile {id} with {script:?} script");

    let mut events = vec![json!({"status": "info", "message": "Initiating load test"})];
    match script {
        Script::Complete => {
            let result_id = uuid::Uuid::new_v4().to_string();
            state.inner.results.write()?.insert(result_id.clone());
            events.push(json!({"status": "info", "message": "Load test in progress"}));
            events.push(json!({
                "status": "success",
                "result": {
                    "meshery_id": result_id,
                    "name": param("name"),
                    "mesh": param("mesh"),
                    "test_start_time": "2024-03-01T10:00:00Z",
                    "runner_results": {
                        "URL": param("url"),
                        "LoadGenerator": param("loadGenerator"),
                        "RequestedQPS": param("qps"),
                        "NumThreads": param("c"),
                        "RequestedDuration": format!("{}{}", param("t"), param("dur")),
                        "ActualQPS": 4.98,
                        "DurationHistogram": {"Count": 150, "Avg": 0.012},
                    },
                },
            }));
        }
        Script::Fail => {
            events.push(json!({"status": "error", "message": "unable to reach the target"}))
        }
        Script::Empty => events.push(json!({"status": "success", "result": {"meshery_id": ""}})),
        Script::Drop | Script::Slow => {}
    }

    let guard = StreamGuard::new(state.clone());
    let frames = stream::iter(events).then(|event| async move {
        tokio::time::sleep(EVENT_DELAY).await;
        Ok::<_, Infallible>(Event::default().data(event.to_string()))
    });
    let body = match script {
        Script::Slow => frames.chain(stream::pending()).boxed(),
        _ => frames.boxed(),
    };
    let body = body
        .map(move |frame| {
            let _guard = &guard;
            frame
        })
        .boxed();

    Ok(Sse::new(body).keep_alive(KeepAlive::new().interval(KEEP_ALIVE)))
}

async fn result(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<String, MockError> {
    if state.inner.results.read()?.contains(&id) {
        Ok(format!(
            "meshery_id: {id}\nrunner_results:\n  ActualQPS: 4.98\n"
        ))
    } else {
        Err(MockError::NotFound(format!("result {id}")))
    }
}

/** Environment **/

async fn prefs() -> Json<Value> {
    Json(json!({
        "anonymousUsageStats": true,
        "loadTestPrefs": {"qps": 20, "c": 4, "t": "1m", "gen": "wrk2"},
    }))
}

async fn static_board(State(state): State<MockState>) -> Result<Json<Value>, MockError> {
    if state.inner.boards_unavailable.load(Ordering::SeqCst) {
        return Err(MockError::NoCluster);
    }
    Ok(Json(json!({
        "cluster": {"title": "Cluster", "panels": [{"id": 1, "title": "CPU"}]},
        "node": {"title": "Node", "panels": [{"id": 2, "title": "Memory"}]},
    })))
}

async fn meshes() -> Json<Value> {
    Json(json!({"available_meshes": ["Linkerd", "Istio", "Open Service Mesh"]}))
}

async fn graphql(Json(body): Json<Value>) -> Json<Value> {
    debug!("GraphQL variables: {}", body["variables"]);
    Json(json!({
        "data": {
            "controlPlanesState": [
                {
                    "name": "istio",
                    "members": [{
                        "name": "istiod",
                        "version": "1.20.0",
                        "component": "istiod",
                        "namespace": "istio-system",
                    }],
                },
                {"name": "open_service_mesh", "members": []},
            ]
        }
    }))
}
