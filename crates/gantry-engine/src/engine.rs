use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{CacheMode, EngineConfig};
use crate::error::EngineError;
use crate::registry::client::RegistryClient;
use crate::types::{workload_key, DefinitionRecord, DeployedDefinition, StartedInstance};

/// Operations a demo node needs from a workload engine. The production
/// implementation fronts the shared registry; tests swap in
/// [`InMemoryEngine`].
#[async_trait]
pub trait WorkloadEngine: Send + Sync {
    /// Number of definitions currently registered.
    async fn count_definitions(&self) -> Result<u64, EngineError>;

    /// Registers a definition. The store assigns the index and key; content
    /// is opaque and never inspected.
    async fn deploy(&self, name: &str, content: &str) -> Result<DeployedDefinition, EngineError>;

    /// Starts one instance of the newest definition registered under `key`.
    async fn start_instance_by_key(&self, key: &str) -> Result<StartedInstance, EngineError>;
}

/// Engine backed by the shared HTTP registry. In [`CacheMode::Local`] it
/// keeps resolved definitions in-process; in [`CacheMode::Clustered`] every
/// resolution goes back to the registry.
#[derive(Debug)]
pub struct RegistryEngine {
    client: RegistryClient,
    cache_mode: CacheMode,
    definition_cache: Mutex<HashMap<String, DefinitionRecord>>,
}

impl RegistryEngine {
    /// Builds an engine and verifies the registry is reachable. An engine
    /// that cannot see its registry is useless, so construction fails
    /// instead of deferring the surprise to the first real call.
    pub async fn build(config: EngineConfig) -> Result<Self, EngineError> {
        let client = RegistryClient::new(
            &config.registry_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        client.health().await?;
        info!(
            registry_url = %client.base_url(),
            cache_mode = ?config.cache_mode,
            "workload engine ready"
        );
        Ok(Self {
            client,
            cache_mode: config.cache_mode,
            definition_cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    /// Resolves a definition, consulting the in-process cache in local mode.
    pub async fn definition(&self, key: &str) -> Result<DefinitionRecord, EngineError> {
        if self.cache_mode == CacheMode::Local {
            if let Some(record) = self.definition_cache.lock().await.get(key) {
                debug!(%key, "definition served from the local cache");
                return Ok(record.clone());
            }
        }
        let record = self.client.definition_by_key(key).await?;
        if self.cache_mode == CacheMode::Local {
            self.definition_cache
                .lock()
                .await
                .insert(key.to_string(), record.clone());
        }
        Ok(record)
    }

    /// Releases the engine. The registry itself stays up; only this node's
    /// view of it goes away.
    pub fn shutdown(self) {
        info!("closing down the workload engine");
    }
}

#[async_trait]
impl WorkloadEngine for RegistryEngine {
    async fn count_definitions(&self) -> Result<u64, EngineError> {
        self.client.count_definitions().await
    }

    async fn deploy(&self, name: &str, content: &str) -> Result<DeployedDefinition, EngineError> {
        self.client.register_definition(name, content).await
    }

    async fn start_instance_by_key(&self, key: &str) -> Result<StartedInstance, EngineError> {
        self.definition(key).await?;
        self.client.start_instance(key).await
    }
}

/// In-memory engine for tests and offline wiring. Mirrors the registry's
/// append-only key assignment so sequences look identical to callers.
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    definitions: Mutex<Vec<DefinitionRecord>>,
    started: Mutex<Vec<String>>,
    deploy_capacity: Option<usize>,
    poisoned_keys: HashSet<String>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of accepted deployments; registrations past the cap
    /// are rejected, standing in for a store that ran out of room.
    pub fn with_deploy_capacity(capacity: usize) -> Self {
        Self {
            deploy_capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Makes every start of `key` fail, standing in for a definition whose
    /// instances cannot be scheduled.
    pub fn poison_key(mut self, key: impl Into<String>) -> Self {
        self.poisoned_keys.insert(key.into());
        self
    }

    pub async fn deployed(&self) -> Vec<DefinitionRecord> {
        self.definitions.lock().await.clone()
    }

    /// Keys of started instances, in start order.
    pub async fn started_keys(&self) -> Vec<String> {
        self.started.lock().await.clone()
    }
}

#[async_trait]
impl WorkloadEngine for InMemoryEngine {
    async fn count_definitions(&self) -> Result<u64, EngineError> {
        Ok(self.definitions.lock().await.len() as u64)
    }

    async fn deploy(&self, name: &str, content: &str) -> Result<DeployedDefinition, EngineError> {
        let mut definitions = self.definitions.lock().await;
        if let Some(capacity) = self.deploy_capacity {
            if definitions.len() >= capacity {
                return Err(EngineError::Rejected {
                    status: 503,
                    message: "definition store is full".to_string(),
                });
            }
        }
        let index = definitions.len() as u64 + 1;
        let record = DefinitionRecord {
            id: Uuid::new_v4(),
            index,
            key: workload_key(index),
            name: name.to_string(),
            content: content.to_string(),
        };
        let receipt = DeployedDefinition {
            id: record.id,
            index: record.index,
            key: record.key.clone(),
            name: record.name.clone(),
        };
        definitions.push(record);
        Ok(receipt)
    }

    async fn start_instance_by_key(&self, key: &str) -> Result<StartedInstance, EngineError> {
        if self.poisoned_keys.contains(key) {
            return Err(EngineError::Rejected {
                status: 503,
                message: format!("instances of '{key}' cannot be scheduled"),
            });
        }
        let definitions = self.definitions.lock().await;
        let record = definitions
            .iter()
            .rev()
            .find(|record| record.key == key)
            .ok_or_else(|| EngineError::DefinitionNotFound(key.to_string()))?;
        let instance = StartedInstance {
            instance_id: Uuid::new_v4(),
            key: key.to_string(),
            definition_id: record.id,
        };
        drop(definitions);
        self.started.lock().await.push(key.to_string());
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::server::RegistryServer;

    fn config_for(url: String, cache_mode: CacheMode) -> EngineConfig {
        EngineConfig {
            registry_url: url,
            cache_mode,
            request_timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn in_memory_engine_assigns_sequential_keys() {
        let engine = InMemoryEngine::new();
        engine.deploy("unit-1", "alpha").await.unwrap();
        let receipt = engine.deploy("unit-2", "beta").await.unwrap();
        assert_eq!(receipt.key, "workload2");
        assert_eq!(engine.count_definitions().await.unwrap(), 2);

        let started = engine.start_instance_by_key("workload1").await.unwrap();
        assert_eq!(started.key, "workload1");
        assert_eq!(engine.started_keys().await, vec!["workload1".to_string()]);
    }

    #[tokio::test]
    async fn in_memory_engine_rejects_deploys_past_capacity() {
        let engine = InMemoryEngine::with_deploy_capacity(1);
        engine.deploy("unit-1", "alpha").await.unwrap();
        let err = engine.deploy("unit-2", "beta").await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected { .. }));
        assert_eq!(engine.count_definitions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn in_memory_engine_fails_starts_of_poisoned_keys() {
        let engine = InMemoryEngine::new().poison_key("workload1");
        engine.deploy("unit-1", "alpha").await.unwrap();
        let err = engine.start_instance_by_key("workload1").await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected { .. }));
        assert!(engine.started_keys().await.is_empty());
    }

    #[tokio::test]
    async fn build_fails_when_the_registry_is_unreachable() {
        let err = RegistryEngine::build(config_for(
            "http://127.0.0.1:9".to_string(),
            CacheMode::Local,
        ))
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }

    #[tokio::test]
    async fn local_mode_serves_repeat_resolutions_from_the_cache() {
        let handle = RegistryServer::start("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let url = format!("http://{}", handle.local_addr());
        let engine = RegistryEngine::build(config_for(url, CacheMode::Local))
            .await
            .unwrap();
        let receipt = engine.deploy("unit-1", "alpha").await.unwrap();
        let first = engine.definition(&receipt.key).await.unwrap();

        // With the registry gone, only the cached copy can answer.
        handle.stop().await;
        let second = engine.definition(&receipt.key).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn clustered_mode_always_resolves_against_the_registry() {
        let handle = RegistryServer::start("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let url = format!("http://{}", handle.local_addr());
        let engine = RegistryEngine::build(config_for(url, CacheMode::Clustered))
            .await
            .unwrap();
        let receipt = engine.deploy("unit-1", "alpha").await.unwrap();
        engine.definition(&receipt.key).await.unwrap();

        handle.stop().await;
        let err = engine.definition(&receipt.key).await.unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }
}
