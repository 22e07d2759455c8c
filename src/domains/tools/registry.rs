//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - The ordered catalog of tool descriptors (`tools/list`)
//! - Dispatch of tool calls with required-argument checks (`tools/call`)
//! - Normalization of handler outcomes into `CallToolResult`
//!
//! Every transport goes through this registry, so protocol errors and tool
//! failures look the same whether the client speaks over stdio, TCP or HTTP.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject, Tool};
use tracing::{info, instrument, warn};

use crate::core::config::Config;

use super::definitions::{StockApiClient, StockInformationTool};
use super::error::{ToolError, UpstreamError};
use super::handlers::{ToolHandler, error_result, success_result};

/// Message used when a handler fails without saying why.
const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// One inbound tool call.
#[derive(Debug, Clone, Default)]
pub struct ToolInvocation {
    /// Name of the tool to run.
    pub name: String,

    /// Arguments as sent by the client.
    pub arguments: JsonObject,
}

impl ToolInvocation {
    /// Create a new invocation.
    pub fn new(name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Tool registry - owns every tool handler and dispatches calls to them.
#[derive(Clone)]
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create a registry from an explicit, ordered list of handlers.
    pub fn new(handlers: Vec<Arc<dyn ToolHandler>>) -> Self {
        Self { handlers }
    }

    /// Create the production registry, wiring tools to their upstream clients.
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        let client = Arc::new(StockApiClient::new(&config.upstream, &config.credentials)?);
        let stock: Arc<dyn ToolHandler> = Arc::new(StockInformationTool::new(client));

        Ok(Self::new(vec![stock]))
    }

    /// Get all tool names, in catalog order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.handlers
            .iter()
            .map(|h| &*h.descriptor().name)
            .collect()
    }

    /// Get all tools as Tool models (metadata), in catalog order.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.handlers
            .iter()
            .map(|h| h.descriptor().clone())
            .collect()
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers
            .iter()
            .find(|h| h.descriptor().name == name)
    }

    /// Dispatch a tool call to the matching handler.
    ///
    /// Unknown names and bad arguments come back as `Err` before the handler
    /// runs. Anything the handler itself fails with comes back as an
    /// `isError: true` result.
    #[instrument(skip(self, invocation), fields(tool = %invocation.name))]
    pub async fn call_tool(&self, invocation: ToolInvocation) -> Result<CallToolResult, ToolError> {
        let Some(handler) = self.find(&invocation.name) else {
            warn!("Unknown tool requested: {}", invocation.name);
            return Err(ToolError::not_found(invocation.name));
        };

        check_required(handler.descriptor(), &invocation.arguments)?;
        handler.validate(&invocation.arguments)?;

        info!("Executing tool {}", invocation.name);

        let outcome = handler
            .execute(&invocation.arguments)
            .await
            .and_then(|data| {
                serde_json::to_string_pretty(&data)
                    .map_err(|e| UpstreamError::request(e.to_string()))
            });

        Ok(match outcome {
            Ok(text) => success_result(text),
            Err(e) => {
                let message = e.to_string();
                let message = if message.is_empty() {
                    UNKNOWN_ERROR
                } else {
                    message.as_str()
                };
                error_result(format!(
                    "Error fetching {} information: {}",
                    handler.domain(),
                    message
                ))
            }
        })
    }
}

/// Reject the call if any field in the schema's `required` list is absent,
/// `null`, or an empty string.
fn check_required(tool: &Tool, arguments: &JsonObject) -> Result<(), ToolError> {
    let Some(required) = tool.input_schema.get("required").and_then(|r| r.as_array()) else {
        return Ok(());
    };

    for field in required.iter().filter_map(|f| f.as_str()) {
        let present = match arguments.get(field) {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(ToolError::invalid_arguments(format!("{field} is required")));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::StockDataSource;
    use rmcp::model::RawContent;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays canned upstream outcomes and counts how often it was asked.
    #[derive(Default)]
    struct StubSource {
        outcomes: Mutex<VecDeque<Result<serde_json::Value, UpstreamError>>>,
        calls: AtomicUsize,
        tickers: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn replying(outcomes: Vec<Result<serde_json::Value, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                ..Default::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl StockDataSource for StubSource {
        async fn fetch_stock(&self, ticker: &str) -> Result<serde_json::Value, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.tickers.lock().unwrap().push(ticker.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("stub ran out of outcomes")
        }
    }

    fn registry_with(source: Arc<StubSource>) -> ToolRegistry {
        let tool: Arc<dyn ToolHandler> = Arc::new(StockInformationTool::new(source));
        ToolRegistry::new(vec![tool])
    }

    fn args(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn stock_call(ticker: serde_json::Value) -> ToolInvocation {
        ToolInvocation::new("get_stock_information", args(json!({ "stockTicker": ticker })))
    }

    fn text_of(result: &CallToolResult) -> &str {
        assert_eq!(result.content.len(), 1);
        match &result.content[0].raw {
            RawContent::Text(text) => &text.text,
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_list_tools_single_descriptor() {
        let registry = registry_with(StubSource::replying(vec![]));
        let tools = registry.list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "get_stock_information");
        assert_eq!(tools[0].input_schema.get("required"), Some(&json!(["stockTicker"])));
    }

    #[test]
    fn test_list_tools_is_stable() {
        let registry = registry_with(StubSource::replying(vec![]));
        let first: Vec<_> = registry.list_tools().into_iter().map(|t| t.name).collect();
        let second: Vec<_> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(first, second);
        assert_eq!(registry.tool_names(), vec!["get_stock_information"]);
    }

    #[test]
    fn test_from_config_registers_stock_tool() {
        let registry = ToolRegistry::from_config(&Config::default()).unwrap();
        assert_eq!(registry.tool_names(), vec![StockInformationTool::NAME]);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_method_not_found() {
        let source = StubSource::replying(vec![]);
        let registry = registry_with(source.clone());

        let err = registry
            .call_tool(ToolInvocation::new("bogus_tool", JsonObject::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::NotFound(ref name) if name == "bogus_tool"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_or_empty_ticker_is_invalid_params() {
        let source = StubSource::replying(vec![]);
        let registry = registry_with(source.clone());

        let invocations = vec![
            ToolInvocation::new("get_stock_information", JsonObject::new()),
            stock_call(json!("")),
            stock_call(json!(null)),
            stock_call(json!(42)),
        ];

        for invocation in invocations {
            let err = registry.call_tool(invocation).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)), "got {err:?}");
        }
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_ticker_message() {
        let registry = registry_with(StubSource::replying(vec![]));
        let err = registry
            .call_tool(ToolInvocation::new("get_stock_information", JsonObject::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "stockTicker is required");
    }

    #[tokio::test]
    async fn test_success_is_pretty_json() {
        let source = StubSource::replying(vec![Ok(json!({ "price": 190.5 }))]);
        let registry = registry_with(source.clone());

        let result = registry.call_tool(stock_call(json!("AAPL"))).await.unwrap();

        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "{\n  \"price\": 190.5\n}");
        assert_eq!(source.tickers.lock().unwrap().as_slice(), ["AAPL"]);
    }

    #[tokio::test]
    async fn test_success_text_round_trips_and_keeps_key_order() {
        let payload = json!({
            "meta": { "symbol": "MSFT", "processedTime": "2024-01-01T00:00:00Z" },
            "body": { "sharesOutstanding": { "raw": 7_430_000_000u64, "fmt": "7.43B" } },
            "alpha": [1, 2.5, null, true]
        });
        let source = StubSource::replying(vec![Ok(payload.clone())]);
        let registry = registry_with(source);

        let result = registry.call_tool(stock_call(json!("MSFT"))).await.unwrap();
        let text = text_of(&result);

        let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, payload);
        assert!(text.find("\"meta\"").unwrap() < text.find("\"alpha\"").unwrap());
    }

    #[tokio::test]
    async fn test_status_failure_is_error_result() {
        let source = StubSource::replying(vec![Err(UpstreamError::Status(404))]);
        let registry = registry_with(source);

        let result = registry.call_tool(stock_call(json!("AAPL"))).await.unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            text_of(&result),
            "Error fetching stock information: API request failed with status 404"
        );
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_fallback() {
        let source = StubSource::replying(vec![Err(UpstreamError::Request(String::new()))]);
        let registry = registry_with(source);

        let result = registry.call_tool(stock_call(json!("AAPL"))).await.unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            text_of(&result),
            "Error fetching stock information: Unknown error occurred"
        );
    }

    #[tokio::test]
    async fn test_registry_keeps_serving_after_failure() {
        let source = StubSource::replying(vec![
            Err(UpstreamError::request("connection refused")),
            Ok(json!({ "price": 1 })),
        ]);
        let registry = registry_with(source.clone());

        let failed = registry.call_tool(stock_call(json!("AAPL"))).await.unwrap();
        assert_eq!(failed.is_error, Some(true));
        assert!(text_of(&failed).contains("connection refused"));

        let ok = registry.call_tool(stock_call(json!("AAPL"))).await.unwrap();
        assert_eq!(ok.is_error, Some(false));
        assert_eq!(source.calls(), 2);
    }
}
