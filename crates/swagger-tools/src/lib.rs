//! Swagger 2.0 -> MCP tooling.
//!
//! Turns a Swagger document into a catalog of MCP tools and proxies `tools/call` invocations to
//! the described REST API over HTTP.
//!
//! This crate contains **no** transport logic; the `swagger-mcp` binary owns the stdio JSON-RPC
//! surface.

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod naming;
pub mod proxy;
pub mod redact;
pub mod request;
pub mod resolver;
pub mod runtime;
pub mod schema;
pub mod semantics;
