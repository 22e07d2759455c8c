//! Domains module containing business logic organized by bounded contexts.
//!
//! The server exposes a single bounded context, tools. Resources and prompts
//! are not advertised in the server capabilities.

pub mod tools;
