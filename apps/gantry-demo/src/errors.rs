use std::io;
use std::net::AddrParseError;
use std::num::ParseIntError;

use gantry_engine::{EngineError, ServerError};
use thiserror::Error;

/// Everything that can end a demo run early. Recoverable conditions (a
/// peer-owned registry port, one failed deployment or start) never show up
/// here; they degrade to log lines inside the phase that hit them.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("cannot pick an engine configuration from '{0}': use 'default' or 'distributed'")]
    InvalidMode(String),
    #[error("invalid registry address '{addr}'")]
    InvalidRegistryAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },
    #[error("'{input}' is not a count")]
    InvalidCount {
        input: String,
        #[source]
        source: ParseIntError,
    },
    #[error("console input unavailable")]
    Console(#[source] io::Error),
    #[error("failed to start the shared registry server")]
    RegistryStart(#[source] ServerError),
    #[error("failed to build the workload engine")]
    EngineConstruction(#[source] EngineError),
    #[error("registry query failed")]
    Registry(#[from] EngineError),
    #[error("no workload definitions are registered; nothing to launch")]
    EmptyDefinitionSet,
}

impl DemoError {
    /// Usage mistakes exit with 2, matching what clap does for malformed
    /// invocations; everything else is a runtime failure and exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DemoError::InvalidMode(_)
            | DemoError::InvalidRegistryAddr { .. }
            | DemoError::InvalidCount { .. } => 2,
            _ => 1,
        }
    }
}
