mod roster;

use serde::{Deserialize, Serialize};

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

fn to_value<T: Serialize>(value: T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    to_value(InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "rosterdex".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let sort_properties = serde_json::json!({
        "type": "string",
        "description": "Sort key (default: 'name')",
        "enum": ["name", "school", "damage"]
    });
    let direction_properties = serde_json::json!({
        "type": "string",
        "description": "Sort direction (default: 'asc')",
        "enum": ["asc", "desc"]
    });

    let tools = vec![
        Tool {
            name: "roster_list".to_string(),
            description: "List characters of the directory page by page, optionally limited to one school. Pages are merged in order without duplicates; the status tells whether more pages exist and carries the error of a failed page while keeping the records already loaded. Configure the API with ROSTERDEX_API_BASE.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "description": "School to list (e.g., 'Gehenna'), or 'All' (default)"
                    },
                    "pages": {
                        "type": "number",
                        "description": "Number of pages to load (default: 1)"
                    },
                    "perPage": {
                        "type": "number",
                        "description": "Records per page (default: 20)"
                    },
                    "sort": sort_properties,
                    "dir": direction_properties,
                    "filter": {
                        "type": "string",
                        "description": "Only keep records whose name, school or damage type contains this text (case-insensitive)"
                    }
                }
            }),
        },
        Tool {
            name: "roster_search".to_string(),
            description: "Search characters by name on the server. The query must have at least 2 characters. Returns every match, sorted.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Name or part of a name (e.g., 'Shiroko')"
                    },
                    "sort": sort_properties,
                    "dir": direction_properties
                },
                "required": ["query"]
            }),
        },
        Tool {
            name: "roster_show".to_string(),
            description: "Show one character by name. When several share the name, the one from 'category' is preferred. With 'context', previous and next entries of that list are included for navigation.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Exact character name"
                    },
                    "category": {
                        "type": "string",
                        "description": "Preferred school when the name is shared"
                    },
                    "context": {
                        "type": "string",
                        "description": "List the character was opened from: a school or 'All'"
                    },
                    "sort": sort_properties,
                    "dir": direction_properties
                },
                "required": ["name"]
            }),
        },
    ];

    to_value(ToolsList { tools })
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?;

    match params.name.as_str() {
        "roster_list" => roster::handle_roster_list(params.arguments, global).await,
        "roster_search" => roster::handle_roster_search(params.arguments, global).await,
        "roster_show" => roster::handle_roster_show(params.arguments, global).await,
        _ => Err(JsonRpcError::invalid_params(format!(
            "Unknown tool: {}",
            params.name
        ))),
    }
}
