use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix shared by every registry-assigned definition key.
pub const WORKLOAD_KEY_PREFIX: &str = "workload";

/// Key assigned to the definition registered at `index` (1-based). The
/// registry hands indices out sequentially, so key `workload3` always means
/// "the third definition ever registered".
pub fn workload_key(index: u64) -> String {
    format!("{WORKLOAD_KEY_PREFIX}{index}")
}

/// A workload definition held by the registry. Content is opaque to the
/// registry; only the sequential index and the key derived from it carry
/// meaning for routing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionRecord {
    pub id: Uuid,
    pub index: u64,
    pub key: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDefinitionRequest {
    pub name: String,
    pub content: String,
}

/// Receipt for a registered definition, minus the (potentially large) body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployedDefinition {
    pub id: Uuid,
    pub index: u64,
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartInstanceRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartedInstance {
    pub instance_id: Uuid,
    pub key: String,
    pub definition_id: Uuid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryStats {
    pub definitions: u64,
    pub instances_started: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
