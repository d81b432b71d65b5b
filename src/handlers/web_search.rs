use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use tracing::{info, warn};

use crate::protocol::{JsonRpcError, ToolResult};
use crate::search::format_search_results;
use crate::tools::{ToolContext, ToolDefinition, ToolFuture};

pub const TOOL_NAME: &str = "web_search";
pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const MIN_RESULTS: u32 = 1;
pub const MAX_RESULTS: u32 = 20;

/// Arguments for the `web_search` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
    #[serde(default = "default_max_results", deserialize_with = "whole_number")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

/// Accepts any JSON number the schema calls an integer, `5.0` included.
fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = Number::deserialize(deserializer)?;
    if let Some(v) = n.as_u64() {
        return u32::try_from(v).map_err(de::Error::custom);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&f) => Ok(f as u32),
        _ => Err(de::Error::custom(format!("expected a whole number, got {n}"))),
    }
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: TOOL_NAME.into(),
        description: "Search the web for information using DuckDuckGo".into(),
        input_schema: json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to execute",
                    "minLength": 1
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 10)",
                    "default": DEFAULT_MAX_RESULTS,
                    "minimum": MIN_RESULTS,
                    "maximum": MAX_RESULTS
                }
            }
        }),
    }
}

/// Handle a `web_search` tool call.
///
/// Out-of-range `max_results` never gets here: the schema rejects it with
/// -32602, so the bounds below only guard direct callers.
pub fn call<'a>(ctx: &'a ToolContext, arguments: Map<String, Value>) -> ToolFuture<'a> {
    Box::pin(async move {
        let args: WebSearchArgs = serde_json::from_value(Value::Object(arguments))
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments for web_search: {e}")))?;

        if args.query.trim().is_empty() {
            return Err(JsonRpcError::invalid_params("Query parameter is required"));
        }
        if !(MIN_RESULTS..=MAX_RESULTS).contains(&args.max_results) {
            return Err(JsonRpcError::invalid_params(format!(
                "max_results must be between {MIN_RESULTS} and {MAX_RESULTS}"
            )));
        }

        ctx.stats.increment_searches();
        info!(query = %args.query, max_results = args.max_results, "web search");

        let response = ctx
            .search
            .search(&args.query, args.max_results as usize)
            .await
            .map_err(|e| {
                warn!(query = %args.query, error = %e, "web search failed");
                JsonRpcError::from(e)
            })?;

        Ok(ToolResult::text(format_search_results(&response)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Result<WebSearchArgs, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn integral_floats_are_whole_numbers() {
        assert_eq!(args(json!({"query": "q", "max_results": 5.0})).unwrap().max_results, 5);
        assert_eq!(args(json!({"query": "q", "max_results": 20})).unwrap().max_results, 20);
        assert_eq!(args(json!({"query": "q"})).unwrap().max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn fractions_and_negatives_are_not() {
        assert!(args(json!({"query": "q", "max_results": 2.5})).is_err());
        assert!(args(json!({"query": "q", "max_results": -1})).is_err());
        assert!(args(json!({"query": "q", "max_results": "5"})).is_err());
    }
}
