use std::sync::Arc;

use gamesanpi::utils::ListingFilter;
use gamesanpi::{Refresher, ScraperError, WebScraper};
use rmcp::{
    ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

#[derive(Debug, Clone)]
pub struct McpServer {
    refresher: Arc<Refresher>,
    tool_router: ToolRouter<Self>,
}

fn scraper_error(context: &str, e: ScraperError) -> McpError {
    match e {
        ScraperError::RefreshInProgress => McpError::internal_error(
            "Another refresh is still running, try again shortly".to_string(),
            None,
        ),
        e => McpError::internal_error(format!("{context}: {e}"), None),
    }
}

#[tool_router]
impl McpServer {
    pub fn new() -> Result<Self, anyhow::Error> {
        Ok(Self {
            refresher: Arc::new(Refresher::new(WebScraper::new()?)),
            tool_router: Self::tool_router(),
        })
    }

    #[tool(
        name = "list_articles",
        description = "List the articles linked from the gamesanpi.com front page, newest first. Supports filtering by publication date range, limit, and offset."
    )]
    pub async fn list_articles(
        &self,
        Parameters(filters): Parameters<ListingFilter>,
    ) -> Result<String, McpError> {
        let filters = filters
            .validate()
            .inspect_err(|e| log::error!("Invalid params: {e:?}"))
            .map_err(|e| McpError::invalid_params(e, None))?;

        let articles = self
            .refresher
            .refresh_articles()
            .await
            .inspect_err(|e| log::error!("Failed to list articles: {e}"))
            .map_err(|e| scraper_error("Failed to list articles", e))?;

        let articles = filters.apply(articles);
        let json = serde_json::to_string_pretty(&articles)
            .inspect_err(|e| log::error!("Serialization error: {e:?}"))
            .map_err(|e| {
                McpError::internal_error(format!("Failed to serialize articles: {e:?}"), None)
            })?;

        Ok(json)
    }

    #[tool(
        name = "discover_illustrations",
        description = "Find up to 10 illustrations (illust1.png to illust3.png) published with the newest 15 gamesanpi.com articles, newest first. Each entry carries the image URL and the owning article's URL, title, and date."
    )]
    pub async fn discover_illustrations(&self) -> Result<String, McpError> {
        let illustrations = self
            .refresher
            .refresh_illustrations()
            .await
            .inspect_err(|e| log::error!("Failed to discover illustrations: {e}"))
            .map_err(|e| scraper_error("Failed to discover illustrations", e))?;

        let json = serde_json::to_string_pretty(&illustrations).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize illustrations: {e}"), None)
        })?;

        Ok(json)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(include_str!("./instructions.md").to_string()),
            ..Default::default()
        }
    }
}
