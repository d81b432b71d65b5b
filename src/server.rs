use std::sync::Arc;

use tracing::info;

use crate::config::{Mode, ServerConfig};
use crate::handlers::Dispatcher;
use crate::search::{DuckDuckGoClient, SearchError};
use crate::stats::StatsRegistry;
use crate::tools::{ToolRegistry, ToolRegistryError};
use crate::transport::{self, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to build search client: {0}")]
    Search(#[from] SearchError),
    #[error("failed to build tool registry: {0}")]
    Tools(#[from] ToolRegistryError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// MCP web search server: wires the dispatcher to the configured transport.
pub struct McpServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let search = DuckDuckGoClient::new(config.search_endpoint.clone(), config.search_timeout)?;
        let tools = ToolRegistry::builtin()?;
        let stats = Arc::new(StatsRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(tools, Arc::new(search), stats));

        Ok(Self { config, dispatcher })
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub async fn run(&self) -> Result<(), ServerError> {
        info!(
            mode = ?self.config.mode,
            endpoint = %self.config.search_endpoint,
            timeout = ?self.config.search_timeout,
            "websearch-mcp starting"
        );

        match self.config.mode {
            Mode::Stdio => transport::stdio::run(&self.dispatcher).await?,
            Mode::Http => transport::http::run(Arc::clone(&self.dispatcher), self.config.port).await?,
        }

        Ok(())
    }
}
