use gamesanpi_mcp::{McpServer, init_logging};
use rmcp::{ServiceExt, transport::stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    log::info!("Serving gamesanpi tools over stdio");

    let server = McpServer::new()?;
    let running = server
        .serve(stdio())
        .await
        .inspect_err(|e| log::error!("Failed to start stdio transport: {e:?}"))?;

    let reason = running.waiting().await?;
    log::info!("Stdio session ended: {reason:?}");

    Ok(())
}
