//! `swagger-mcp`: MCP stdio server over a Swagger 2.0 described REST API.

pub mod cli;
pub mod error;
pub mod logging;
pub mod mcp;
