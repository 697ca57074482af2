use std::sync::Arc;

use simple_math_server::{domain::tools::ToolRegistry, logging, mcp, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let registry = Arc::new(ToolRegistry::with_builtin_tools());
    info!(
        protocol_version = mcp::server::PROTOCOL_VERSION,
        tools = %registry.tool_names().join(", "),
        "server starting"
    );

    let state = AppState::new(registry);
    mcp::stdio::serve_stdio(&state).await?;

    info!("server stopped");
    Ok(())
}
