use std::time::Duration;

use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::error::EngineError;
use crate::types::{
    CountResponse, DefinitionRecord, DeployedDefinition, ErrorBody, RegisterDefinitionRequest,
    RegistryStats, StartInstanceRequest, StartedInstance,
};

/// Thin HTTP client for the shared definition registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EngineError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cheap reachability probe used while constructing an engine.
    pub async fn health(&self) -> Result<(), EngineError> {
        let response = self
            .http
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await?;
        reject_on_error(response).await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<RegistryStats, EngineError> {
        let response = self
            .http
            .get(format!("{}/stats", self.base_url))
            .send()
            .await?;
        Ok(reject_on_error(response).await?.json().await?)
    }

    pub async fn count_definitions(&self) -> Result<u64, EngineError> {
        let response = self
            .http
            .get(format!("{}/definitions/count", self.base_url))
            .send()
            .await?;
        let body: CountResponse = reject_on_error(response).await?.json().await?;
        Ok(body.count)
    }

    pub async fn register_definition(
        &self,
        name: &str,
        content: &str,
    ) -> Result<DeployedDefinition, EngineError> {
        let response = self
            .http
            .post(format!("{}/definitions", self.base_url))
            .json(&RegisterDefinitionRequest {
                name: name.to_string(),
                content: content.to_string(),
            })
            .send()
            .await?;
        let receipt: DeployedDefinition = reject_on_error(response).await?.json().await?;
        debug!(key = %receipt.key, "definition registered with the registry");
        Ok(receipt)
    }

    pub async fn definition_by_key(&self, key: &str) -> Result<DefinitionRecord, EngineError> {
        let response = self
            .http
            .get(format!("{}/definitions/by-key/{key}", self.base_url))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EngineError::DefinitionNotFound(key.to_string()));
        }
        Ok(reject_on_error(response).await?.json().await?)
    }

    pub async fn start_instance(&self, key: &str) -> Result<StartedInstance, EngineError> {
        let response = self
            .http
            .post(format!("{}/instances", self.base_url))
            .json(&StartInstanceRequest {
                key: key.to_string(),
            })
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EngineError::DefinitionNotFound(key.to_string()));
        }
        Ok(reject_on_error(response).await?.json().await?)
    }
}

/// Maps non-success statuses onto [`EngineError::Rejected`], pulling the
/// registry's error body through when it sent one.
async fn reject_on_error(response: Response) -> Result<Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(EngineError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::server::RegistryServer;
    use crate::types::workload_key;

    async fn started_registry() -> (crate::registry::server::RegistryServerHandle, RegistryClient)
    {
        let handle = RegistryServer::start("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let client = RegistryClient::new(
            &format!("http://{}", handle.local_addr()),
            Duration::from_secs(2),
        )
        .unwrap();
        (handle, client)
    }

    #[tokio::test]
    async fn registration_assigns_sequential_keys() {
        let (handle, client) = started_registry().await;
        assert_eq!(client.count_definitions().await.unwrap(), 0);

        let first = client.register_definition("unit-1", "alpha").await.unwrap();
        let second = client.register_definition("unit-2", "beta").await.unwrap();
        assert_eq!(first.key, workload_key(1));
        assert_eq!(second.key, workload_key(2));
        assert_eq!(client.count_definitions().await.unwrap(), 2);

        let record = client.definition_by_key(&second.key).await.unwrap();
        assert_eq!(record.name, "unit-2");
        assert_eq!(record.content, "beta");

        handle.stop().await;
    }

    #[tokio::test]
    async fn starting_an_instance_records_it_in_the_stats() {
        let (handle, client) = started_registry().await;
        client.register_definition("unit-1", "alpha").await.unwrap();

        let instance = client.start_instance(&workload_key(1)).await.unwrap();
        assert_eq!(instance.key, workload_key(1));
        let stats = client.stats().await.unwrap();
        assert_eq!(stats.definitions, 1);
        assert_eq!(stats.instances_started, 1);

        handle.stop().await;
    }

    #[tokio::test]
    async fn unknown_keys_map_to_definition_not_found() {
        let (handle, client) = started_registry().await;
        let err = client.definition_by_key("workload9").await.unwrap_err();
        assert!(matches!(err, EngineError::DefinitionNotFound(key) if key == "workload9"));

        let err = client.start_instance("workload9").await.unwrap_err();
        assert!(matches!(err, EngineError::DefinitionNotFound(_)));

        handle.stop().await;
    }

    #[tokio::test]
    async fn blank_definition_names_are_rejected() {
        let (handle, client) = started_registry().await;
        let err = client.register_definition("  ", "alpha").await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected { status: 422, .. }));

        handle.stop().await;
    }

    #[tokio::test]
    async fn requests_against_a_stopped_registry_fail_with_transport_errors() {
        let (handle, client) = started_registry().await;
        handle.stop().await;
        let err = client.count_definitions().await.unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }
}
