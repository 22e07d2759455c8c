//! Tool handlers module.
//!
//! Every tool implements [`ToolHandler`]; the registry owns the handlers as
//! trait objects and never needs to know a concrete tool type.

use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use tracing::warn;

use super::error::{ToolError, UpstreamError};

/// Trait for implementing tool handlers.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the tool metadata (name, description, input schema).
    fn descriptor(&self) -> &Tool;

    /// Noun used in failure messages, e.g. "stock" in
    /// "Error fetching stock information: ...".
    fn domain(&self) -> &str;

    /// Check the arguments beyond the schema's `required` list.
    ///
    /// Runs before any side effect, so a rejection here never reaches the network.
    fn validate(&self, _arguments: &JsonObject) -> Result<(), ToolError> {
        Ok(())
    }

    /// Execute the tool with already validated arguments.
    async fn execute(&self, arguments: &JsonObject) -> Result<serde_json::Value, UpstreamError>;
}

/// Create an error result with a formatted message.
pub fn error_result(message: String) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message)])
}

/// Create a success result with text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}
