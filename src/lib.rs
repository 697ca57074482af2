use std::sync::Arc;

pub mod domain;
pub mod errors;
pub mod logging;
pub mod mcp;

use domain::tools::ToolRegistry;

/// Shared, read-only server state: the registry is fully populated before the
/// session loop starts and never mutated afterwards, so it can be handed to
/// any number of sequential loops without synchronization.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}
