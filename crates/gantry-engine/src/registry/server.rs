use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ServerError;
use crate::types::{
    workload_key, CountResponse, DefinitionRecord, DeployedDefinition, ErrorBody,
    RegisterDefinitionRequest, RegistryStats, StartInstanceRequest, StartedInstance,
};

/// The process-wide definition store behind the HTTP surface. Definitions are
/// append-only; the next index is always `definitions.len() + 1`, which keeps
/// keys sequential even across clients registering concurrently.
#[derive(Debug, Default)]
struct RegistryState {
    definitions: Vec<DefinitionRecord>,
    instances_started: u64,
}

type SharedState = Arc<Mutex<RegistryState>>;

/// In-process registry server shared by all demo nodes on a host. Exactly one
/// process can hold the well-known address; the rest talk to it over HTTP.
pub struct RegistryServer;

impl RegistryServer {
    /// Binds `addr` and serves the registry until the returned handle is
    /// stopped or dropped. A contended address surfaces as
    /// [`ServerError::AddressInUse`] so callers can fall back to client-only
    /// operation.
    pub async fn start(addr: SocketAddr) -> Result<RegistryServerHandle, ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(|err| {
            if err.kind() == io::ErrorKind::AddrInUse {
                ServerError::AddressInUse { addr }
            } else {
                ServerError::Bind { addr, source: err }
            }
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let state: SharedState = Arc::new(Mutex::new(RegistryState::default()));
        let app = Router::new()
            .route("/healthz", get(health))
            .route("/stats", get(stats))
            .route("/definitions", post(register_definition))
            .route("/definitions/count", get(count_definitions))
            .route("/definitions/by-key/:key", get(definition_by_key))
            .route("/instances", post(start_instance))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = serve.await {
                error!(error = %err, "registry server terminated unexpectedly");
            }
        });
        info!(addr = %local_addr, "registry server listening");

        Ok(RegistryServerHandle {
            local_addr,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// Owning handle for a running registry server. Dropping it also shuts the
/// server down, but `stop` waits for in-flight requests to drain.
#[derive(Debug)]
pub struct RegistryServerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RegistryServerHandle {
    /// Address the server actually bound, useful when starting on port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Gracefully stops the server and waits for it to finish.
    pub async fn stop(self) {
        let RegistryServerHandle {
            local_addr,
            shutdown,
            task,
        } = self;
        let _ = shutdown.send(());
        let _ = task.await;
        info!(addr = %local_addr, "registry server stopped");
    }
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn stats(State(state): State<SharedState>) -> Json<RegistryStats> {
    let state = state.lock().await;
    Json(RegistryStats {
        definitions: state.definitions.len() as u64,
        instances_started: state.instances_started,
    })
}

async fn count_definitions(State(state): State<SharedState>) -> Json<CountResponse> {
    let state = state.lock().await;
    Json(CountResponse {
        count: state.definitions.len() as u64,
    })
}

async fn register_definition(
    State(state): State<SharedState>,
    Json(request): Json<RegisterDefinitionRequest>,
) -> Result<Json<DeployedDefinition>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::unprocessable("definition name must not be empty"));
    }
    let mut state = state.lock().await;
    let index = state.definitions.len() as u64 + 1;
    let record = DefinitionRecord {
        id: Uuid::new_v4(),
        index,
        key: workload_key(index),
        name: request.name,
        content: request.content,
    };
    let receipt = DeployedDefinition {
        id: record.id,
        index: record.index,
        key: record.key.clone(),
        name: record.name.clone(),
    };
    info!(index, key = %record.key, name = %record.name, "workload definition registered");
    state.definitions.push(record);
    Ok(Json(receipt))
}

async fn definition_by_key(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Result<Json<DefinitionRecord>, ApiError> {
    let state = state.lock().await;
    resolve_key(&state, &key)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no definition registered under '{key}'")))
}

async fn start_instance(
    State(state): State<SharedState>,
    Json(request): Json<StartInstanceRequest>,
) -> Result<Json<StartedInstance>, ApiError> {
    let mut state = state.lock().await;
    let definition_id = match resolve_key(&state, &request.key) {
        Some(record) => record.id,
        None => {
            return Err(ApiError::not_found(format!(
                "no definition registered under '{}'",
                request.key
            )))
        }
    };
    state.instances_started += 1;
    let instance = StartedInstance {
        instance_id: Uuid::new_v4(),
        key: request.key,
        definition_id,
    };
    info!(key = %instance.key, instance_id = %instance.instance_id, "workload instance started");
    Ok(Json(instance))
}

/// Newest record wins when a key appears more than once; the store is
/// append-only, so "newest" is simply the last match.
fn resolve_key<'a>(state: &'a RegistryState, key: &str) -> Option<&'a DefinitionRecord> {
    state.definitions.iter().rev().find(|record| record.key == key)
}
