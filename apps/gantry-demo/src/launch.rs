use gantry_engine::{workload_key, WorkloadEngine};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::errors::DemoError;

/// What became of a launch batch. `requested` always equals
/// `started + failed`; a failed start never cancels the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchSummary {
    pub requested: u32,
    pub started: u32,
    pub failed: u32,
}

/// Starts `count` workload instances, each against a definition key drawn
/// uniformly from the registered range. Launching against an empty registry
/// is a fatal mistake; a single start failing is not.
pub async fn launch_instances(
    engine: &dyn WorkloadEngine,
    count: u32,
) -> Result<LaunchSummary, DemoError> {
    let registered = engine.count_definitions().await?;
    if registered == 0 {
        return Err(DemoError::EmptyDefinitionSet);
    }

    info!(count, registered, "starting workload instances");
    let mut summary = LaunchSummary {
        requested: count,
        started: 0,
        failed: 0,
    };
    for _ in 0..count {
        // Fresh draw per request; nothing ties one request's key to the next.
        let choice = rand::thread_rng().gen_range(1..=registered);
        let key = workload_key(choice);
        match engine.start_instance_by_key(&key).await {
            Ok(instance) => {
                debug!(%key, instance_id = %instance.instance_id, "workload instance started");
                summary.started += 1;
            }
            Err(err) => {
                warn!(%key, error = %err, "instance start failed; moving on to the next request");
                summary.failed += 1;
            }
        }
    }
    info!(
        started = summary.started,
        failed = summary.failed,
        "instance launch finished"
    );
    Ok(summary)
}
