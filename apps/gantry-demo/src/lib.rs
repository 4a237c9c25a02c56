//! Demo driver for the gantry workload engine.
//!
//! Several nodes started with the same registry address cooperate without
//! coordination: whichever binds the well-known port first owns the shared
//! registry, whichever sees an unseeded registry first deploys the workload
//! definitions, and every node then launches instances against the shared
//! set.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod console;
pub mod errors;
pub mod launch;
pub mod mode;
pub mod run;
pub mod seed;
pub mod template;
