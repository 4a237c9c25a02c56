use std::fmt;

use crate::errors::DemoError;

/// Engine configuration selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// Single node with an in-process definition cache.
    CoLocated,
    /// Cluster member that defers all definition lookups to the registry.
    Distributed,
}

impl EngineMode {
    /// Case-insensitive match against the two accepted tokens. Anything
    /// else is a usage error; there is no default mode to fall back to.
    pub fn select(token: &str) -> Result<Self, DemoError> {
        match token.to_ascii_lowercase().as_str() {
            "default" => Ok(EngineMode::CoLocated),
            "distributed" => Ok(EngineMode::Distributed),
            _ => Err(DemoError::InvalidMode(token.to_string())),
        }
    }

    /// Name of the embedded configuration resource backing this mode.
    pub fn config_resource(&self) -> &'static str {
        match self {
            EngineMode::CoLocated => "engine.default.toml",
            EngineMode::Distributed => "engine.distributed.toml",
        }
    }

    pub fn is_distributed(&self) -> bool {
        matches!(self, EngineMode::Distributed)
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineMode::CoLocated => write!(f, "default"),
            EngineMode::Distributed => write!(f, "distributed"),
        }
    }
}
