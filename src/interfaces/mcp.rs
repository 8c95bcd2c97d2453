use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::task;

use crate::{
    application::{
        dtos::{
            template_query_from_contract, ContractReviewRequest, IntoRawQuery,
            PrecedentSearchRequest, TemplateSearchRequest, CONTRACT_EXCERPT_CHARS,
        },
        format::{format_precedents, format_templates},
        services::validator::MAX_TOPIC_CHARS,
        RetrievalService,
    },
    domain::{DocumentDomain, DomainError, SearchResult},
    AppHandles,
};

const TOOL_SEARCH_PRECEDENTS: &str = "search_precedents";
const TOOL_SEARCH_TEMPLATES: &str = "search_contract_templates";
const TOOL_CONTRACT_TEMPLATES: &str = "find_templates_for_contract";
const TOOL_STATUS: &str = "retrieval_status";

#[derive(Clone)]
pub struct JurisearchMcpServer {
    handles: Arc<AppHandles>,
    tool_router: ToolRouter<Self>,
}

impl JurisearchMcpServer {
    pub fn new(handles: Arc<AppHandles>) -> Self {
        Self {
            handles,
            tool_router: Self::tool_router(),
        }
    }

    async fn precedents(&self, raw: Map<String, Value>) -> Result<CallToolResult, McpError> {
        let result = run_search(Arc::clone(&self.handles.precedents), raw, MAX_TOPIC_CHARS).await?;
        let text = format_precedents(&result.results);
        structured(&result, text)
    }

    async fn templates(&self, raw: Map<String, Value>) -> Result<CallToolResult, McpError> {
        self.templates_bounded(raw, MAX_TOPIC_CHARS).await
    }

    async fn contract_templates(
        &self,
        request: ContractReviewRequest,
    ) -> Result<CallToolResult, McpError> {
        self.templates_bounded(template_query_from_contract(&request), CONTRACT_EXCERPT_CHARS)
            .await
    }

    async fn templates_bounded(
        &self,
        raw: Map<String, Value>,
        max_topic_chars: usize,
    ) -> Result<CallToolResult, McpError> {
        let result = run_search(Arc::clone(&self.handles.templates), raw, max_topic_chars).await?;
        let text = format_templates(&result.results);
        structured(&result, text)
    }

    async fn status(&self) -> Result<CallToolResult, McpError> {
        let precedents = Arc::clone(&self.handles.precedents);
        let templates = Arc::clone(&self.handles.templates);
        let (precedents, templates) =
            task::spawn_blocking(move || (precedents.health(), templates.health()))
                .await
                .map_err(|err| internal_error(err.to_string()))?;

        Ok(CallToolResult::structured(json!({
            "precedents": precedents,
            "templates": templates,
        })))
    }
}

#[tool_router]
impl JurisearchMcpServer {
    #[tool(
        name = "search_precedents",
        description = "Search court precedents (jurisprudence) related to a legal topic, optionally restricted to one court."
    )]
    async fn search_precedents(
        &self,
        Parameters(payload): Parameters<PrecedentSearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.precedents(payload.into_raw()).await
    }

    #[tool(
        name = "search_contract_templates",
        description = "Search contract templates and standard clauses, optionally restricted to one contract type."
    )]
    async fn search_contract_templates(
        &self,
        Parameters(payload): Parameters<TemplateSearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.templates(payload.into_raw()).await
    }

    #[tool(
        name = "find_templates_for_contract",
        description = "Find reference templates for a contract under review, using the start of its text as the query."
    )]
    async fn find_templates_for_contract(
        &self,
        Parameters(payload): Parameters<ContractReviewRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.contract_templates(payload).await
    }

    #[tool(
        name = "retrieval_status",
        description = "Report whether each retrieval engine is backed by its vector store or the fallback corpus."
    )]
    async fn retrieval_status(&self) -> Result<CallToolResult, McpError> {
        self.status().await
    }
}

impl ServerHandler for JurisearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: rmcp::model::Implementation {
                name: "jurisearch-mcp".into(),
                title: Some("Jurisearch Legal Retrieval".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                r#"Jurisearch retrieves Brazilian court precedents and contract templates.

- search_precedents: topic (3-500 chars), optional court (STF, STJ, TST, TRF1-TRF5 or "all"),
  startDate/endDate (YYYY-MM-DD), limit (1-50, default 10), relevanceThreshold (0-1, default 0.7).
- search_contract_templates: topic, optional contractType, limit, relevanceThreshold.
- find_templates_for_contract: contractText of the document under review, optional contractType.

Results are ordered by relevance. Each response carries structured data and a readable summary
in the `formatted` field. When the vector store is unavailable a small built-in corpus is used."#
                    .into(),
            ),
        }
    }
}

async fn run_search<D: DocumentDomain>(
    service: Arc<RetrievalService<D>>,
    raw: Map<String, Value>,
    max_topic_chars: usize,
) -> Result<SearchResult<D::Document>, McpError> {
    task::spawn_blocking(move || service.search_bounded(&raw, max_topic_chars))
        .await
        .map_err(|err| internal_error(err.to_string()))?
        .map_err(map_domain_error)
}

/// Serialized result with the rendered text added under `formatted`.
fn structured<T: Serialize>(result: &T, text: String) -> Result<CallToolResult, McpError> {
    let mut value = serde_json::to_value(result).map_err(|err| internal_error(err.to_string()))?;
    if let Value::Object(map) = &mut value {
        map.insert("formatted".into(), Value::String(text));
    }
    Ok(CallToolResult::structured(value))
}

fn map_domain_error(err: DomainError) -> McpError {
    match err {
        DomainError::Validation(invalid) => McpError::invalid_params(
            invalid.message.clone(),
            Some(json!({
                "field": invalid.field,
                "received": invalid.received,
            })),
        ),
        DomainError::ToolCall { .. } => McpError::internal_error(err.to_string(), None),
        other => McpError::internal_error(
            "internal error",
            Some(json!({ "kind": other.kind(), "detail": other.to_string() })),
        ),
    }
}

fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(
        "internal MCP server error",
        Some(json!({ "detail": message.into() })),
    )
}

/// Run MCP server using stdio transport (stdin/stdout).
pub async fn run_mcp_stdio_server(handles: Arc<AppHandles>) -> Result<()> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tracing::{debug, error, info};

    let server = JurisearchMcpServer::new(handles);
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                info!(target: "jurisearch::mcp", "Client closed stdio connection");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                debug!(target: "jurisearch::mcp", "Received: {}", trimmed);

                let response = match serde_json::from_str::<Value>(trimmed) {
                    Ok(request) => match handle_jsonrpc_request(&server, request).await {
                        Some(response) => response,
                        None => continue,
                    },
                    Err(e) => {
                        error!(target: "jurisearch::mcp", "Failed to parse JSON-RPC request: {}", e);
                        json!({
                            "jsonrpc": "2.0",
                            "id": Value::Null,
                            "error": {
                                "code": -32700,
                                "message": format!("Parse error: {}", e)
                            }
                        })
                    }
                };

                let response_json = response.to_string();
                if let Err(e) = stdout.write_all(response_json.as_bytes()).await {
                    error!(target: "jurisearch::mcp", "Failed to write response: {}", e);
                    break;
                }
                if let Err(e) = stdout.write_all(b"\n").await {
                    error!(target: "jurisearch::mcp", "Failed to write newline: {}", e);
                    break;
                }
                if let Err(e) = stdout.flush().await {
                    error!(target: "jurisearch::mcp", "Failed to flush stdout: {}", e);
                    break;
                }

                debug!(target: "jurisearch::mcp", "Sent: {}", response_json);
            }
            Err(e) => {
                error!(target: "jurisearch::mcp", "Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!(target: "jurisearch::mcp", "MCP stdio server terminated");
    Ok(())
}

/// Handle one JSON-RPC message. Notifications (no `id`) get no response.
async fn handle_jsonrpc_request(server: &JurisearchMcpServer, request: Value) -> Option<Value> {
    let id = request.get("id").cloned()?;
    let method = request.get("method").and_then(Value::as_str).unwrap_or("");

    let response = match method {
        "initialize" => {
            let info = server.get_info();
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": info.protocol_version,
                    "capabilities": info.capabilities,
                    "serverInfo": info.server_info,
                    "instructions": info.instructions
                }
            })
        }
        "ping" => json!({ "jsonrpc": "2.0", "id": id, "result": {} }),
        "tools/list" => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": { "tools": server.tool_router.list_all() }
        }),
        "tools/call" => match request.get("params") {
            Some(params) => {
                let tool_name = params.get("name").and_then(Value::as_str).unwrap_or("");
                let arguments = params
                    .get("arguments")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();

                match call_tool(server, tool_name, arguments).await {
                    Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
                    Err(e) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": {
                            "code": e.code,
                            "message": e.message,
                            "data": e.data
                        }
                    }),
                }
            }
            None => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32602, "message": "Invalid params" }
            }),
        },
        _ => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {
                "code": -32601,
                "message": format!("Method not found: {}", method)
            }
        }),
    };

    Some(response)
}

/// Search tools take the raw argument map so the validator sees values as sent.
async fn call_tool(
    server: &JurisearchMcpServer,
    name: &str,
    arguments: Map<String, Value>,
) -> Result<CallToolResult, McpError> {
    match name {
        TOOL_SEARCH_PRECEDENTS => server.precedents(arguments).await,
        TOOL_SEARCH_TEMPLATES => server.templates(arguments).await,
        TOOL_CONTRACT_TEMPLATES => {
            match serde_json::from_value::<ContractReviewRequest>(Value::Object(arguments)) {
                Ok(request) => server.contract_templates(request).await,
                Err(e) => Err(McpError::invalid_params(
                    "Invalid find_templates_for_contract arguments",
                    Some(json!({ "detail": e.to_string() })),
                )),
            }
        }
        TOOL_STATUS => server.status().await,
        _ => Err(McpError::invalid_params(
            format!("Unknown tool: {}", name),
            None,
        )),
    }
}
