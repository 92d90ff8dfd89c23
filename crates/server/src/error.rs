//! Mapping of library errors onto MCP error responses.

use rmcp::ErrorData as McpError;
use swagger_mcp_tools::error::SwaggerToolsError;

/// Unknown tools are the caller's mistake (`-32602`); anything else is internal (`-32603`).
#[must_use]
pub fn to_mcp_error(e: &SwaggerToolsError) -> McpError {
    match e {
        SwaggerToolsError::UnknownTool(name) => {
            McpError::invalid_params(format!("Unknown tool: {name}"), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}
