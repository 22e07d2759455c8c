//! Stock information tool.
//!
//! Looks up a ticker through a [`StockDataSource`] and returns the raw
//! upstream payload.

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::client::StockDataSource;
use crate::domains::tools::error::{ToolError, UpstreamError};
use crate::domains::tools::handlers::ToolHandler;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the stock information tool.
#[derive(Debug, Clone, Deserialize)]
pub struct StockInformationParams {
    /// Ticker symbol, e.g. "AAPL".
    #[serde(rename = "stockTicker")]
    pub stock_ticker: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Stock information tool - forwards the upstream stock payload to the client.
pub struct StockInformationTool {
    tool: Tool,
    source: Arc<dyn StockDataSource>,
}

impl StockInformationTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_stock_information";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Returns information about a stock, including its price and other information like trading volume.";

    /// Name of the single required argument.
    pub const TICKER_ARG: &'static str = "stockTicker";

    /// Create the tool on top of a data source.
    pub fn new(source: Arc<dyn StockDataSource>) -> Self {
        Self {
            tool: Self::to_tool(),
            source,
        }
    }

    /// The input schema exactly as advertised to clients.
    ///
    /// Written out by hand: clients match on this shape, and a derived schema
    /// would add `$schema`, `title` and `description` keys.
    pub fn input_schema() -> Arc<JsonObject> {
        let mut properties = JsonObject::new();
        properties.insert(Self::TICKER_ARG.to_string(), json!({ "type": "string" }));

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), json!([Self::TICKER_ARG]));

        Arc::new(schema)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: Self::input_schema(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Deserialize the arguments into typed parameters.
    pub fn parse_params(arguments: &JsonObject) -> Result<StockInformationParams, ToolError> {
        serde_json::from_value(Value::Object(arguments.clone()))
            .map_err(|e| ToolError::invalid_arguments(format!("Invalid arguments: {e}")))
    }
}

#[async_trait::async_trait]
impl ToolHandler for StockInformationTool {
    fn descriptor(&self) -> &Tool {
        &self.tool
    }

    fn domain(&self) -> &str {
        "stock"
    }

    fn validate(&self, arguments: &JsonObject) -> Result<(), ToolError> {
        Self::parse_params(arguments).map(|_| ())
    }

    async fn execute(&self, arguments: &JsonObject) -> Result<Value, UpstreamError> {
        let params =
            Self::parse_params(arguments).map_err(|e| UpstreamError::request(e.to_string()))?;

        info!("Fetching stock information for {}", params.stock_ticker);
        self.source.fetch_stock(&params.stock_ticker).await
    }
}

// ============================================================================
// Tests
// ============================================================================
