pub mod request;
pub mod response;

pub use request::{
    ClientInfo, InitializeParams, JsonRpcRequest, RpcId, ToolCallParams, JSONRPC_VERSION,
};
pub use response::{JsonRpcError, JsonRpcResponse, ToolResult, ToolResultContent};
