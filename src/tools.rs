//! Static tool table: definitions advertised by `tools/list`, the argument
//! validator compiled from each definition's schema, and the handler that
//! `tools/call` routes to.
//!
//! Adding a tool means adding one entry to [`ToolRegistry::builtin`].

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::handlers::web_search;
use crate::protocol::{JsonRpcError, ToolResult};
use crate::schema::{ArgumentValidator, SchemaValidationError};
use crate::search::SearchBackend;
use crate::stats::StatsRegistry;

pub type ToolFuture<'a> = BoxFuture<'a, Result<ToolResult, JsonRpcError>>;

/// Tool entry point. Arguments have already passed schema validation.
pub type ToolHandler = for<'a> fn(&'a ToolContext, Map<String, Value>) -> ToolFuture<'a>;

/// Collaborators a tool handler may use.
#[derive(Clone)]
pub struct ToolContext {
    pub search: Arc<dyn SearchBackend>,
    pub stats: Arc<StatsRegistry>,
}

/// A tool as advertised to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolRegistryError {
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
    #[error("invalid schema for tool {name}: {source}")]
    Schema {
        name: String,
        #[source]
        source: SchemaValidationError,
    },
}

pub struct RegisteredTool {
    definition: ToolDefinition,
    validator: ArgumentValidator,
    handler: ToolHandler,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

impl RegisteredTool {
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Check arguments against the advertised input schema.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<(), JsonRpcError> {
        // The validator needs an owned Value; argument objects are small.
        let instance = Value::Object(arguments.clone());
        self.validator.validate(&instance).map_err(|e| {
            JsonRpcError::invalid_params(format!(
                "Invalid arguments for {}: {e}",
                self.definition.name
            ))
        })
    }

    pub fn call<'a>(&self, ctx: &'a ToolContext, arguments: Map<String, Value>) -> ToolFuture<'a> {
        (self.handler)(ctx, arguments)
    }
}

/// Immutable, ordered set of tools keyed by unique name.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// The tools this server ships with.
    pub fn builtin() -> Result<Self, ToolRegistryError> {
        Self::new(vec![(web_search::definition(), web_search::call as ToolHandler)])
    }

    pub fn new(entries: Vec<(ToolDefinition, ToolHandler)>) -> Result<Self, ToolRegistryError> {
        let mut tools = Vec::with_capacity(entries.len());
        let mut by_name = HashMap::with_capacity(entries.len());

        for (definition, handler) in entries {
            if by_name.contains_key(&definition.name) {
                return Err(ToolRegistryError::DuplicateTool(definition.name));
            }
            let validator = ArgumentValidator::new(&definition.input_schema).map_err(|source| {
                ToolRegistryError::Schema {
                    name: definition.name.clone(),
                    source,
                }
            })?;
            by_name.insert(definition.name.clone(), tools.len());
            tools.push(RegisteredTool {
                definition,
                validator,
                handler,
            });
        }

        Ok(Self { tools, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter().map(RegisteredTool::definition)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
