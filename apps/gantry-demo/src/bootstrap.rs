use std::net::SocketAddr;

use gantry_engine::{RegistryServer, RegistryServerHandle, ServerError};
use tracing::info;

use crate::errors::DemoError;

/// Outcome of racing peers for the shared registry: either this node bound
/// the well-known address and owns the server's lifetime, or a peer beat it
/// to the bind and it runs as a plain client.
#[derive(Debug)]
pub enum ServerOwnership {
    Owner(RegistryServerHandle),
    NotOwner,
}

impl ServerOwnership {
    pub fn is_owner(&self) -> bool {
        matches!(self, ServerOwnership::Owner(_))
    }
}

/// Starts the shared registry, treating a peer-held address as success.
/// Only a bind failure that is not contention aborts the run.
pub async fn start_shared_registry(addr: SocketAddr) -> Result<ServerOwnership, DemoError> {
    match RegistryServer::start(addr).await {
        Ok(handle) => {
            info!(%addr, "this node owns the shared registry");
            Ok(ServerOwnership::Owner(handle))
        }
        Err(ServerError::AddressInUse { .. }) => {
            info!(%addr, "registry already running; continuing as a client-only node");
            Ok(ServerOwnership::NotOwner)
        }
        Err(err) => Err(DemoError::RegistryStart(err)),
    }
}

/// Releases the registry if and only if this node owns it. Peer-owned
/// registries are left untouched for the nodes still using them.
pub async fn release_registry(ownership: ServerOwnership) {
    match ownership {
        ServerOwnership::Owner(handle) => handle.stop().await,
        ServerOwnership::NotOwner => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_node_wins_the_bind_and_the_second_defers() {
        let first = start_shared_registry("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = match &first {
            ServerOwnership::Owner(handle) => handle.local_addr(),
            ServerOwnership::NotOwner => panic!("first node should own the registry"),
        };

        let second = start_shared_registry(addr).await.unwrap();
        assert!(!second.is_owner());

        release_registry(second).await;
        release_registry(first).await;
    }

    #[tokio::test]
    async fn releasing_the_owner_frees_the_address_for_a_new_owner() {
        let first = start_shared_registry("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = match &first {
            ServerOwnership::Owner(handle) => handle.local_addr(),
            ServerOwnership::NotOwner => panic!("first node should own the registry"),
        };
        release_registry(first).await;

        let next = start_shared_registry(addr).await.unwrap();
        assert!(next.is_owner());
        release_registry(next).await;
    }
}
