use std::fs;
use std::path::Path;

use tracing::{info, warn};

/// Positional slot substituted with the 1-based variant index.
pub const TEMPLATE_SLOT: &str = "{0}";

const EMBEDDED_TEMPLATE: &str = include_str!("../resources/workload-template.xml");

/// Workload definition template with one positional slot. The rendered
/// content stays opaque to everything downstream; only the slot is touched.
#[derive(Debug, Clone)]
pub struct WorkloadTemplate {
    raw: String,
}

impl WorkloadTemplate {
    /// The template compiled into the binary, the normal case.
    pub fn embedded() -> Self {
        Self {
            raw: EMBEDDED_TEMPLATE.to_string(),
        }
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Loads a template override from disk. An unreadable file is a warning,
    /// not a failure: the run continues with nothing to deploy.
    pub fn load(path: &Path) -> Option<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => {
                info!(path = %path.display(), "workload template loaded");
                Some(Self { raw })
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read workload template");
                None
            }
        }
    }

    /// Renders variant `index`, substituting every occurrence of the slot.
    pub fn render(&self, index: u64) -> String {
        self.raw.replace(TEMPLATE_SLOT, &index.to_string())
    }
}

/// Picks the template for this run: a path override when given, otherwise
/// the embedded resource.
pub fn resolve(path: Option<&Path>) -> Option<WorkloadTemplate> {
    match path {
        Some(path) => WorkloadTemplate::load(path),
        None => Some(WorkloadTemplate::embedded()),
    }
}
