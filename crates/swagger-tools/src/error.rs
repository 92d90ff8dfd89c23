//! Error types for `swagger-mcp-tools`.

use thiserror::Error;

/// Main error type for Swagger tooling.
#[derive(Error, Debug)]
pub enum SwaggerToolsError {
    /// Configuration errors (invalid config, missing fields, conflicts).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup errors (document rejected, catalog could not be built).
    #[error("Startup error: {0}")]
    Startup(String),

    /// Runtime errors (request could not be built).
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// A `tools/call` named a tool that is not in the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Swagger error: failed to fetch spec from '{url}': {message}")]
    SpecFetch { url: String, message: String },

    #[error("Swagger error: failed to read spec body from '{url}': {message}")]
    SpecReadBody { url: String, message: String },

    #[error("Swagger error: failed to read spec file '{path}': {source}")]
    SpecReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Swagger error: failed to parse spec from '{location}': {message}")]
    SpecParse { location: String, message: String },

    /// `$ref` resolution errors.
    #[error("Reference error: {0}")]
    Reference(String),
}

/// Result type alias for Swagger tooling operations.
pub type Result<T> = std::result::Result<T, SwaggerToolsError>;
