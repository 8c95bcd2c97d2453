#[cfg(feature = "mcp-server")]
use jurisearch::run_mcp_stdio;

/// Jurisearch MCP server over stdio transport (stdin/stdout).
///
/// Spawned by MCP clients that speak newline-delimited JSON-RPC over the
/// process pipes. Logs go to stderr.
///
/// # Example Configuration
///
/// ```json
/// {
///   "mcpServers": {
///     "jurisearch": {
///       "command": "/path/to/mcp-stdio",
///       "env": { "GEMINI_API_KEY": "...", "QDRANT_URL": "...", "QDRANT_API_KEY": "..." }
///     }
///   }
/// }
/// ```
///
/// # Environment Variables
///
/// - `JURISEARCH_LOG`: logging filter (trace, debug, info, warn, error)
/// - `JURISEARCH_CONFIG`: path to a JSON config file
#[cfg(feature = "mcp-server")]
fn main() {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("[jurisearch::mcp-stdio] Failed to start runtime: {err:?}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(run_mcp_stdio()) {
        eprintln!("[jurisearch::mcp-stdio] Runtime failed: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "mcp-server"))]
fn main() {
    eprintln!(
        "[jurisearch::mcp-stdio] Build with `--features mcp-server` to enable the MCP stdio server."
    );
    std::process::exit(1);
}
