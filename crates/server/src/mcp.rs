//! MCP server surface over a [`SwaggerToolSource`], served through rmcp.

use crate::error::to_mcp_error;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt as _,
    model::{
        CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    transport::stdio,
};
use swagger_mcp_tools::runtime::SwaggerToolSource;

#[derive(Debug, Clone)]
pub struct McpServer {
    source: SwaggerToolSource,
}

impl McpServer {
    #[must_use]
    pub fn new(source: SwaggerToolSource) -> Self {
        Self { source }
    }

    /// Serve on the process stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the MCP handshake fails or the service task panics.
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await.inspect_err(|e| {
            tracing::error!("MCP handshake failed: {e}");
        })?;
        let reason = service.waiting().await?;
        tracing::info!(reason = ?reason, "stdio transport closed");
        Ok(())
    }

    fn instructions(&self) -> String {
        let title = self.source.spec_title();
        if title.is_empty() {
            format!("Tools calling the REST API at {}.", self.source.base_url())
        } else {
            format!(
                "Tools calling the {title} API ({}) at {}.",
                self.source.spec_version(),
                self.source.base_url()
            )
        }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(self.instructions()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.source.list_tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.source
            .call_tool(&request.name, request.arguments)
            .await
            .map_err(|e| {
                tracing::debug!(tool = %request.name, error = %e, "tool call rejected");
                to_mcp_error(&e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::ServiceExt as _;
    use serde_json::{Value, json};
    use swagger_mcp_test_support::EchoUpstream;
    use swagger_mcp_tools::config::{ApiSourceConfig, ClientConfig, SpecSource};
    use swagger_mcp_tools::document::SwaggerDocument;
    use swagger_mcp_tools::proxy::InvocationProxy;
    use tokio::io::{
        AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, DuplexStream, Lines, ReadHalf,
        WriteHalf,
    };

    fn server(base_url: &str) -> McpServer {
        let doc = SwaggerDocument::from_value(
            json!({
                "swagger": "2.0",
                "info": { "title": "Petstore", "version": "1.0.0" },
                "paths": {
                    "/pets/{petId}": {
                        "get": {
                            "operationId": "getPet",
                            "summary": "Get a pet",
                            "parameters": [
                                { "name": "petId", "in": "path", "type": "string", "required": true }
                            ]
                        }
                    }
                }
            }),
            "inline",
        )
        .expect("document");

        let mut cfg = ApiSourceConfig::new(SpecSource::File("inline.json".into()));
        cfg.base_url = Some(base_url.to_string());
        let proxy = InvocationProxy::new(&ClientConfig::default()).expect("proxy");
        McpServer::new(SwaggerToolSource::from_document(&cfg, &doc, proxy).expect("source"))
    }

    /// Raw line-delimited JSON-RPC peer connected to a served `McpServer`.
    struct Peer {
        lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl Peer {
        fn connect(server: McpServer) -> Peer {
            let (server_io, client_io) = tokio::io::duplex(64 * 1024);
            tokio::spawn(async move {
                if let Ok(running) = server.serve(server_io).await {
                    let _ = running.waiting().await;
                }
            });
            let (reader, writer) = tokio::io::split(client_io);
            Peer {
                lines: BufReader::new(reader).lines(),
                writer,
            }
        }

        async fn send(&mut self, msg: Value) {
            let mut line = msg.to_string();
            line.push('\n');
            self.writer
                .write_all(line.as_bytes())
                .await
                .expect("write");
            self.writer.flush().await.expect("flush");
        }

        async fn request(&mut self, msg: Value) -> Value {
            self.send(msg).await;
            let line = tokio::time::timeout(std::time::Duration::from_secs(10), self.lines.next_line())
                .await
                .expect("response in time")
                .expect("read")
                .expect("open");
            serde_json::from_str(&line).expect("json response")
        }

        async fn handshake(&mut self, protocol_version: &str) -> Value {
            let init = self
                .request(json!({
                    "jsonrpc": "2.0", "id": 0, "method": "initialize",
                    "params": {
                        "protocolVersion": protocol_version,
                        "capabilities": {},
                        "clientInfo": { "name": "test", "version": "0" }
                    }
                }))
                .await;
            self.send(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
                .await;
            init
        }
    }

    #[test]
    fn info_advertises_tools_and_instructions() {
        let info = server("https://api.example.com").get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "swagger-mcp");
        let instructions = info.instructions.expect("instructions");
        assert!(instructions.contains("Petstore"), "{instructions}");
        assert!(instructions.contains("https://api.example.com"), "{instructions}");
    }

    #[tokio::test]
    async fn handshake_negotiates_down_to_an_older_client_version() {
        let mut peer = Peer::connect(server("https://api.example.com"));
        let init = peer.handshake("2024-11-05").await;

        assert_eq!(init["id"], 0);
        assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
        assert!(init["result"]["capabilities"]["tools"].is_object());
        assert_eq!(init["result"]["serverInfo"]["name"], "swagger-mcp");
    }

    #[tokio::test]
    async fn tools_list_returns_catalog() {
        let mut peer = Peer::connect(server("https://api.example.com"));
        peer.handshake("2025-03-26").await;

        let resp = peer
            .request(json!({ "jsonrpc": "2.0", "id": "a", "method": "tools/list" }))
            .await;
        let tools = resp["result"]["tools"].as_array().expect("tools");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "getPet");
        assert_eq!(tools[0]["description"], "Get a pet");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["petId"]));
        assert_eq!(tools[0]["annotations"]["readOnlyHint"], true);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params_and_session_continues() {
        let mut peer = Peer::connect(server("https://api.example.com"));
        peer.handshake("2025-03-26").await;

        let resp = peer
            .request(json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                "params": { "name": "nope", "arguments": {} }
            }))
            .await;
        assert_eq!(resp["id"], 2);
        assert_eq!(resp["error"]["code"], -32602);

        let ping = peer
            .request(json!({ "jsonrpc": "2.0", "id": 3, "method": "ping" }))
            .await;
        assert_eq!(ping["id"], 3);
        assert!(ping["result"].is_object());
    }

    #[tokio::test]
    async fn tools_call_proxies_to_upstream() {
        let upstream = EchoUpstream::start().await.expect("upstream");
        let mut peer = Peer::connect(server(upstream.base_url().as_str()));
        peer.handshake("2025-03-26").await;

        let resp = peer
            .request(json!({
                "jsonrpc": "2.0", "id": 7, "method": "tools/call",
                "params": { "name": "getPet", "arguments": { "petId": "42" } }
            }))
            .await;

        assert_ne!(resp["result"]["isError"], json!(true));
        let text = resp["result"]["content"][0]["text"].as_str().expect("text");
        let echoed: Value = serde_json::from_str(text).expect("echo json");
        assert_eq!(echoed["path"], "/pets/42");
    }
}
