mod mcp;

pub use mcp::McpServer;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8056";

/// Logs go to stderr: stdout carries the protocol for the stdio transport.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .write_style(env_logger::WriteStyle::Never)
        .init();
}

/// Address for the web transport, taken from `BIND_ADDRESS` when set and non-blank.
pub fn bind_address(configured: Option<String>) -> String {
    configured
        .map(|address| address.trim().to_string())
        .filter(|address| !address.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
}
