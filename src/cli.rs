use clap::Parser;

/// WebSearch MCP Server
#[derive(Debug, Parser)]
#[command(
    name = "websearch-mcp",
    disable_version_flag = true,
    after_help = "Environment Variables:\n  \
        MCP_MODE                 Set to 'http' or 'stdio' (default: stdio)\n  \
        PORT                     Port for HTTP mode (default: 8080)\n  \
        WEBSEARCH_ENDPOINT       Search provider HTML endpoint\n  \
        WEBSEARCH_TIMEOUT_SECS   Seconds before a search is abandoned (default: 30)\n  \
        RUST_LOG / WEBSEARCH_LOG Log filter, written to stderr (default: info)"
)]
pub struct Cli {
    /// Run in stdio mode (default)
    #[arg(long, conflicts_with = "http")]
    pub stdio: bool,

    /// Run in HTTP mode on the specified port (default: 8080)
    #[arg(long, value_name = "PORT", num_args = 0..=1)]
    pub http: Option<Option<u16>>,

    /// Show version information
    #[arg(short = 'v', long)]
    pub version: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags() {
        let cli = Cli::parse_from(["websearch-mcp"]);
        assert!(!cli.stdio);
        assert_eq!(cli.http, None);
        assert!(!cli.version);
    }

    #[test]
    fn http_with_and_without_port() {
        assert_eq!(Cli::parse_from(["websearch-mcp", "--http"]).http, Some(None));
        assert_eq!(
            Cli::parse_from(["websearch-mcp", "--http", "9000"]).http,
            Some(Some(9000))
        );
    }

    #[test]
    fn short_version_flag() {
        assert!(Cli::parse_from(["websearch-mcp", "-v"]).version);
    }

    #[test]
    fn stdio_and_http_conflict() {
        assert!(Cli::try_parse_from(["websearch-mcp", "--stdio", "--http"]).is_err());
    }
}
