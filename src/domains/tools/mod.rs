//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients to perform
//! specific actions or computations.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `handlers.rs` - The `ToolHandler` trait every tool implements
//! - `registry.rs` - Tool catalog and dispatch, shared by all transports
//! - `error.rs` - Protocol-level and upstream error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Implement `ToolHandler` for it
//! 3. Export in `definitions/mod.rs`
//! 4. Add it to `ToolRegistry::from_config()`

pub mod definitions;
mod error;
mod handlers;
mod registry;

pub use error::{ToolError, UpstreamError};
pub use handlers::{ToolHandler, error_result, success_result};
pub use registry::{ToolInvocation, ToolRegistry};
