//! Stock Information MCP Server
//!
//! A Model Context Protocol server exposing one tool, `get_stock_information`,
//! which fetches statistics for a ticker from the Yahoo Finance API on RapidAPI
//! and returns the JSON payload as-is.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the rmcp `ServerHandler` and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: tool catalog, dispatch and the stock API client
//!
//! # Example
//!
//! ```rust,no_run
//! use stock_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
