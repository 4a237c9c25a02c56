use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Failures raised by engine construction and registry calls.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine configuration could not be parsed or is incomplete.
    #[error("invalid engine configuration: {0}")]
    Config(String),
    /// The registry could not be reached or the response body was malformed.
    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The registry answered with a non-success status.
    #[error("registry rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// No definition is registered under the requested key.
    #[error("no workload definition registered under key '{0}'")]
    DefinitionNotFound(String),
}

/// Failures raised while standing up the shared registry server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Another process already holds the registry address. Callers racing
    /// to start the shared server treat this as "someone else won".
    #[error("registry address {addr} is already in use")]
    AddressInUse { addr: SocketAddr },
    /// The listener could not be bound for a reason other than contention.
    #[error("failed to bind registry listener on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}
