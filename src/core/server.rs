//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to the tool registry.
//!
//! `tools/list` and `tools/call` are implemented by hand rather than through
//! rmcp's `#[tool_handler]` router so that an unknown tool name is reported as
//! `METHOD_NOT_FOUND` and a missing argument as `INVALID_PARAMS`.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use super::error::{Error, Result};
use crate::domains::tools::{ToolError, ToolInvocation, ToolRegistry};

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp. It is cheap to
/// clone; the TCP transport hands one clone to every connection.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tool catalog and dispatcher.
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        let registry = ToolRegistry::from_config(&config)
            .map_err(|e| Error::config(format!("failed to build stock API client: {e}")))?;

        Ok(Self::with_registry(config, registry))
    }

    /// Create a server around an already built registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Instructions sent to clients during initialization.
    pub fn instructions(&self) -> &'static str {
        "Provides stock information. Call get_stock_information with a stockTicker \
         (e.g. \"AAPL\") to receive the raw statistics payload from the stock API."
    }

    /// List all available tools.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.list_tools()
    }

    /// Call a tool by name.
    pub async fn call_tool(
        &self,
        invocation: ToolInvocation,
    ) -> std::result::Result<CallToolResult, ToolError> {
        self.registry.call_tool(invocation).await
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions().to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().into(),
                version: self.version().into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: self.registry.list_tools(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let invocation =
            ToolInvocation::new(request.name.to_string(), request.arguments.unwrap_or_default());

        self.registry
            .call_tool(invocation)
            .await
            .map_err(McpError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::stock::{StockDataSource, StockInformationTool};
    use crate::domains::tools::{ToolHandler, UpstreamError};
    use rmcp::ServiceExt;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::io::{
        AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
    };

    /// Upstream that always answers with a 404 status.
    struct NotFoundSource;

    #[async_trait::async_trait]
    impl StockDataSource for NotFoundSource {
        async fn fetch_stock(&self, _ticker: &str) -> std::result::Result<Value, UpstreamError> {
            Err(UpstreamError::Status(404))
        }
    }

    fn not_found_server() -> McpServer {
        let tool: Arc<dyn ToolHandler> =
            Arc::new(StockInformationTool::new(Arc::new(NotFoundSource)));
        McpServer::with_registry(Config::default(), ToolRegistry::new(vec![tool]))
    }

    async fn send(writer: &mut WriteHalf<DuplexStream>, message: Value) {
        let mut line = message.to_string();
        line.push('\n');
        writer.write_all(line.as_bytes()).await.unwrap();
        writer.flush().await.unwrap();
    }

    async fn recv(lines: &mut Lines<BufReader<ReadHalf<DuplexStream>>>) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
            .await
            .expect("server did not answer in time")
            .unwrap()
            .expect("server closed the stream");
        serde_json::from_str(&line).unwrap()
    }

    #[test]
    fn test_info_reports_configured_identity() {
        let server = McpServer::new(Config::default()).unwrap();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "stock-mcp-server");
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_session_over_newline_delimited_json_rpc() {
        let (server_io, client_io) = tokio::io::duplex(4096);
        let server = not_found_server();
        tokio::spawn(async move {
            if let Ok(service) = server.serve(server_io).await {
                let _ = service.waiting().await;
            }
        });

        let (reader, mut writer) = tokio::io::split(client_io);
        let mut lines = BufReader::new(reader).lines();

        send(
            &mut writer,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "test-client", "version": "0.0.1" }
                }
            }),
        )
        .await;
        let init = recv(&mut lines).await;
        assert_eq!(init["id"], 1);
        assert_eq!(init["result"]["serverInfo"]["name"], "stock-mcp-server");
        assert!(init["result"]["capabilities"]["tools"].is_object());

        send(
            &mut writer,
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        )
        .await;

        send(
            &mut writer,
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {} }),
        )
        .await;
        let list = recv(&mut lines).await;
        assert_eq!(list["id"], 2);
        let tools = list["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "get_stock_information");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["stockTicker"]));

        send(
            &mut writer,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": { "name": "bogus_tool", "arguments": {} }
            }),
        )
        .await;
        let unknown = recv(&mut lines).await;
        assert_eq!(unknown["id"], 3);
        assert_eq!(unknown["error"]["code"], -32601);

        send(
            &mut writer,
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": { "name": "get_stock_information" }
            }),
        )
        .await;
        let missing = recv(&mut lines).await;
        assert_eq!(missing["id"], 4);
        assert_eq!(missing["error"]["code"], -32602);

        send(
            &mut writer,
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": {
                    "name": "get_stock_information",
                    "arguments": { "stockTicker": "ZZZZ" }
                }
            }),
        )
        .await;
        let failed = recv(&mut lines).await;
        assert_eq!(failed["id"], 5);
        assert_eq!(failed["result"]["isError"], true);
        assert_eq!(
            failed["result"]["content"][0]["text"],
            "Error fetching stock information: API request failed with status 404"
        );
    }

    #[test]
    fn test_server_identity_from_config() {
        let server = McpServer::new(Config::default()).unwrap();
        assert_eq!(server.name(), "stock-mcp-server");
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_info_advertises_tools_only() {
        let server = McpServer::new(Config::default()).unwrap();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert!(info.instructions.unwrap().contains("get_stock_information"));
    }

    #[test]
    fn test_list_tools_delegates_to_registry() {
        let server = McpServer::new(Config::default()).unwrap();
        let tools = server.list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "get_stock_information");
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let server = McpServer::new(Config::default()).unwrap();
        let err = server
            .call_tool(ToolInvocation::new("bogus_tool", JsonObject::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::METHOD_NOT_FOUND);
    }
}
