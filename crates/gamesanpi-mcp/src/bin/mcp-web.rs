use std::io;

use gamesanpi_mcp::{McpServer, bind_address, init_logging};
use rmcp::transport::{
    StreamableHttpServerConfig, StreamableHttpService,
    streamable_http_server::session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
    }
    log::info!("Shutting down, closing open sessions");
    token.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let token = CancellationToken::new();
    let config = StreamableHttpServerConfig {
        cancellation_token: token.child_token(),
        ..Default::default()
    };

    // One server, and so one refresh guard, per session.
    let service = StreamableHttpService::new(
        || McpServer::new().map_err(|e| io::Error::other(format!("Failed to create session: {e}"))),
        LocalSessionManager::default().into(),
        config,
    );

    let address = bind_address(std::env::var("BIND_ADDRESS").ok());
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let app = axum::Router::new().nest_service("/mcp", service);

    log::info!("Serving gamesanpi tools on http://{}/mcp", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(token))
        .await?;

    Ok(())
}
