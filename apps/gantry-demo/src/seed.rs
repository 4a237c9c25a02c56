use gantry_engine::{EngineError, WorkloadEngine};
use tracing::{info, warn};

use crate::template::WorkloadTemplate;

/// A registry with at least one definition counts as seeded, no matter which
/// node put it there or how many definitions it holds.
pub async fn is_seeded(engine: &dyn WorkloadEngine) -> Result<bool, EngineError> {
    Ok(engine.count_definitions().await? > 0)
}

/// File name registered for variant `index`.
pub fn unit_name(index: u64) -> String {
    format!("workload-{index}.xml")
}

/// Renders and registers `count` template variants in index order. A failed
/// registration ends the batch early; whatever was registered before the
/// failure stays in place and the run carries on with it.
pub async fn deploy_workloads(
    engine: &dyn WorkloadEngine,
    template: &WorkloadTemplate,
    count: u32,
) -> u32 {
    info!(count, "deploying workload definitions");
    let mut deployed = 0;
    for index in 1..=u64::from(count) {
        let name = unit_name(index);
        let content = template.render(index);
        match engine.deploy(&name, &content).await {
            Ok(receipt) => {
                info!(index, key = %receipt.key, "workload definition deployed");
                deployed += 1;
            }
            Err(err) => {
                warn!(index, error = %err, "deployment failed; keeping the variants registered so far");
                break;
            }
        }
    }
    info!(deployed, "workload deployment finished");
    deployed
}
