//! Stock tools module.
//!
//! - `client`: RapidAPI HTTP client behind the `StockDataSource` trait
//! - `information`: the `get_stock_information` tool

pub mod client;
pub mod information;

pub use client::{StockApiClient, StockDataSource};
pub use information::{StockInformationParams, StockInformationTool};
