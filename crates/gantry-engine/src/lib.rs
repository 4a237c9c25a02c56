//! Gantry Engine: workload engine and shared definition registry for the
//! gantry cluster demo.
//!
//! Responsibilities:
//! - hosting the in-process registry server that one node per host owns
//! - client-side access to the registry over HTTP
//! - the [`WorkloadEngine`] seam demo code and tests program against
//! - engine configuration, including local vs clustered definition caching

mod config;
mod engine;
mod error;
pub mod registry;
mod types;

pub use config::{CacheMode, EngineConfig};
pub use engine::{InMemoryEngine, RegistryEngine, WorkloadEngine};
pub use error::{EngineError, ServerError};
pub use registry::client::RegistryClient;
pub use registry::server::{RegistryServer, RegistryServerHandle};
pub use types::{
    workload_key, DefinitionRecord, DeployedDefinition, RegistryStats, StartedInstance,
    WORKLOAD_KEY_PREFIX,
};
