use std::net::SocketAddr;

use gantry_engine::RegistryEngine;
use tracing::{info, warn};

use crate::bootstrap::{self, ServerOwnership};
use crate::cli::Cli;
use crate::config::{self, DemoConfig};
use crate::console::{self, Prompt, StdinPrompt};
use crate::errors::DemoError;
use crate::launch;
use crate::mode::EngineMode;
use crate::seed;
use crate::template;

/// Runs one demo node end to end with the interactive console.
pub async fn run(cli: Cli) -> Result<(), DemoError> {
    run_with(cli, &StdinPrompt).await
}

/// Like [`run`], but with the console injected so callers can script it.
pub async fn run_with(cli: Cli, prompt: &dyn Prompt) -> Result<(), DemoError> {
    let config = DemoConfig::try_from(cli)?;
    info!(mode = %config.mode, registry_addr = %config.registry_addr, "starting demo node");

    let ownership = bootstrap::start_shared_registry(config.registry_addr).await?;
    // The bound address is authoritative: binding port 0 hands out an
    // ephemeral port the configured address does not know about.
    let registry_addr = match &ownership {
        ServerOwnership::Owner(handle) => handle.local_addr(),
        ServerOwnership::NotOwner => config.registry_addr,
    };

    // Whatever happens from here on, an owned registry must come down with
    // this node, so failures are collected rather than returned early.
    let result = drive(&config, registry_addr, prompt).await;
    bootstrap::release_registry(ownership).await;
    if result.is_ok() {
        info!("all done");
    }
    result
}

async fn drive(
    config: &DemoConfig,
    registry_addr: SocketAddr,
    prompt: &dyn Prompt,
) -> Result<(), DemoError> {
    // Seeding runs through a short-lived co-located engine that is torn down
    // before the mode-selected engine comes up.
    let seed_engine =
        RegistryEngine::build(config::engine_config(EngineMode::CoLocated, registry_addr)?)
            .await
            .map_err(DemoError::EngineConstruction)?;
    if seed::is_seeded(&seed_engine).await? {
        info!("workload definitions already deployed; skipping seeding");
    } else {
        let count = match config.definitions {
            Some(count) => count,
            None => console::prompt_count(
                prompt,
                "How many workload definitions should be deployed?",
            )?,
        };
        if let Some(template) = template::resolve(config.template_path.as_deref()) {
            seed::deploy_workloads(&seed_engine, &template, count).await;
        }
    }
    seed_engine.shutdown();

    info!(mode = %config.mode, resource = config.mode.config_resource(), "building the workload engine");
    let engine = RegistryEngine::build(config::engine_config(config.mode, registry_addr)?)
        .await
        .map_err(DemoError::EngineConstruction)?;

    let instances = match config.instances {
        Some(count) => count,
        None => console::prompt_count(prompt, "How many workload instances should be started?")?,
    };
    launch::launch_instances(&engine, instances).await?;

    if config.mode.is_distributed() {
        info!("distributed node idling so peers can exercise the shared registry; press Ctrl-C to finish");
        wait_for_stop_signal().await;
    }

    engine.shutdown();
    Ok(())
}

async fn wait_for_stop_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for the stop signal; finishing now");
    }
}
