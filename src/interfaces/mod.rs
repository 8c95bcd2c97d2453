//! Agent-facing adapters over the retrieval engines.
#[cfg(feature = "mcp-server")]
pub mod mcp;
