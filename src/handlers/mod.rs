pub mod web_search;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::protocol::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams,
    JSONRPC_VERSION,
};
use crate::search::SearchBackend;
use crate::stats::StatsRegistry;
use crate::tools::{ToolContext, ToolRegistry};
use crate::version::VersionInfo;

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo` and the HTTP health payload.
pub const SERVER_NAME: &str = "websearch-mcp";

type MethodFuture<'a> = BoxFuture<'a, Result<Value, JsonRpcError>>;
type MethodHandler = for<'a> fn(&'a Dispatcher, Option<&'a Value>) -> MethodFuture<'a>;

/// Routes JSON-RPC requests to method handlers.
///
/// Transport-agnostic and free of per-connection state: one instance is shared
/// by every connection. Each call to [`handle`](Self::handle) counts one
/// request, and at most one error.
pub struct Dispatcher {
    methods: HashMap<&'static str, MethodHandler>,
    tools: ToolRegistry,
    context: ToolContext,
}

impl Dispatcher {
    pub fn new(
        tools: ToolRegistry,
        search: Arc<dyn SearchBackend>,
        stats: Arc<StatsRegistry>,
    ) -> Self {
        let mut methods: HashMap<&'static str, MethodHandler> = HashMap::new();
        methods.insert("initialize", initialize);
        methods.insert("notifications/initialized", initialized);
        methods.insert("tools/list", tools_list);
        methods.insert("tools/call", tools_call);
        methods.insert("ping", ping);
        methods.insert("stats/get", stats_get);

        Self {
            methods,
            tools,
            context: ToolContext { search, stats },
        }
    }

    pub fn stats(&self) -> &Arc<StatsRegistry> {
        &self.context.stats
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Dispatch a JSON-RPC request to the appropriate handler.
    ///
    /// Returns `None` for notifications (no response required). Otherwise the
    /// response carries the request's `id` and exactly one of result/error.
    pub async fn handle(&self, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        self.context.stats.increment_requests();

        let outcome = self.route(req).await;
        if let Err(err) = &outcome {
            self.context.stats.increment_errors();
            debug!(method = %req.method, code = err.code, message = %err.message, "request failed");
        }

        if req.is_notification() {
            return None;
        }

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(req.id.clone(), result),
            Err(err) => JsonRpcResponse::error(req.id.clone(), err),
        })
    }

    async fn route(&self, req: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        if req.jsonrpc != JSONRPC_VERSION {
            return Err(JsonRpcError::invalid_request());
        }

        let handler = self
            .methods
            .get(req.method.as_str())
            .ok_or_else(|| JsonRpcError::method_not_found(&req.method))?;

        handler(self, req.params.as_ref()).await
    }
}

fn initialize<'a>(_d: &'a Dispatcher, params: Option<&'a Value>) -> MethodFuture<'a> {
    Box::pin(async move {
        // Client capabilities are accepted as-is.
        if let Some(Ok(init)) = params.map(|v| InitializeParams::deserialize(v)) {
            let client = init.client_info.as_ref();
            debug!(
                client = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
                client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                protocol = init.protocol_version.as_deref().unwrap_or("unspecified"),
                "initialize"
            );
        }

        Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": VersionInfo::current().version
            }
        }))
    })
}

fn initialized<'a>(_d: &'a Dispatcher, _params: Option<&'a Value>) -> MethodFuture<'a> {
    Box::pin(async { Ok(Value::Null) })
}

fn ping<'a>(_d: &'a Dispatcher, _params: Option<&'a Value>) -> MethodFuture<'a> {
    Box::pin(async { Ok(Value::String("pong".into())) })
}

fn tools_list<'a>(d: &'a Dispatcher, _params: Option<&'a Value>) -> MethodFuture<'a> {
    Box::pin(async move {
        let tools: Vec<_> = d.tools.definitions().collect();
        Ok(json!({ "tools": tools }))
    })
}

fn stats_get<'a>(d: &'a Dispatcher, _params: Option<&'a Value>) -> MethodFuture<'a> {
    Box::pin(async move {
        serde_json::to_value(d.context.stats.snapshot())
            .map_err(|e| JsonRpcError::internal_error(format!("Failed to encode stats: {e}")))
    })
}

fn tools_call<'a>(d: &'a Dispatcher, params: Option<&'a Value>) -> MethodFuture<'a> {
    Box::pin(async move {
        let params = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params for tools/call"))?;
        let call = ToolCallParams::deserialize(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {e}")))?;

        let tool = d
            .tools
            .get(&call.name)
            .ok_or_else(|| JsonRpcError::tool_not_found(&call.name))?;
        tool.validate(&call.arguments)?;

        let result = tool.call(&d.context, call.arguments).await?;
        serde_json::to_value(&result).map_err(|e| {
            warn!(tool = %call.name, error = %e, "failed to encode tool result");
            JsonRpcError::internal_error(format!("Failed to encode tool result: {e}"))
        })
    })
}
