//! MCP server exposing a `web_search` tool.
//!
//! JSON-RPC 2.0 envelopes arrive over newline-delimited stdio or a WebSocket
//! (`/ws`), are routed by [`handlers::Dispatcher`], and search requests are
//! served by scraping the DuckDuckGo HTML endpoint. HTTP mode also exposes
//! read-only `/health`, `/stats` and `/version` endpoints.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod protocol;
pub mod search;
pub mod server;
pub mod stats;
pub mod tools;
pub mod transport;
pub mod version;

pub mod schema;
