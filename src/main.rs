use clap::Parser;
use tracing::error;

use websearch_mcp::cli::Cli;
use websearch_mcp::config::ServerConfig;
use websearch_mcp::logging;
use websearch_mcp::server::McpServer;
use websearch_mcp::version::VersionInfo;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.version {
        print!("{}", VersionInfo::current().render());
        return;
    }

    let mut config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("websearch-mcp: configuration error: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli(&cli);

    logging::init(&config.log_level);

    let server = match McpServer::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!("startup failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("fatal error: {e}");
        std::process::exit(1);
    }
}
