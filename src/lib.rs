use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

pub mod application;
pub mod domain;
pub mod infrastructure;
#[cfg(feature = "mcp-server")]
pub mod interfaces;
pub mod settings;

use application::services::{EmbeddingEngine, EmbeddingProvider, RetrievalService};
use domain::{ContractTemplates, DocumentDomain, Precedents};
use infrastructure::{FallbackCorpus, GeminiEmbedEngine, QdrantVectorStore, RandomEmbedEngine};
use settings::{AppConfig, EmbeddingSettings, VectorStoreSettings};

const SYNTHETIC_MODEL: &str = "jurisearch/synthetic";

/// One retrieval engine per document domain, sharing an embedding provider.
pub struct AppHandles {
    pub precedents: Arc<RetrievalService<Precedents>>,
    pub templates: Arc<RetrievalService<ContractTemplates>>,
    pub config: AppConfig,
}

/// Load configuration from file and environment, then wire both engines.
pub fn build_environment() -> Result<AppHandles> {
    let config = AppConfig::load().context("failed to load configuration")?;
    build_environment_with(config)
}

/// Wire both engines from an explicit configuration.
///
/// Missing credentials never fail here: they select synthetic embeddings or
/// the fallback corpus.
pub fn build_environment_with(config: AppConfig) -> Result<AppHandles> {
    let embedder =
        init_embedder(&config.embedding).context("failed to initialise embedding provider")?;

    let precedents = Arc::new(init_service(Precedents, embedder.clone(), &config.precedents));
    let templates = Arc::new(init_service(ContractTemplates, embedder, &config.templates));

    Ok(AppHandles {
        precedents,
        templates,
        config,
    })
}

fn init_embedder(settings: &EmbeddingSettings) -> Result<EmbeddingProvider> {
    let fallback: Arc<dyn EmbeddingEngine> =
        Arc::new(RandomEmbedEngine::try_new(SYNTHETIC_MODEL, settings.dimensions)?);

    let primary: Option<Arc<dyn EmbeddingEngine>> = match GeminiEmbedEngine::try_new(settings) {
        Ok(engine) => {
            info!(
                target: "jurisearch::embedding",
                model = %settings.model,
                dims = settings.dimensions,
                "remote embedding backend configured"
            );
            Some(Arc::new(engine))
        }
        Err(err) => {
            info!(
                target: "jurisearch::embedding",
                reason = %err,
                "remote embeddings disabled; synthetic vectors will be used"
            );
            None
        }
    };

    Ok(EmbeddingProvider::new(primary, fallback, settings.dimensions))
}

fn init_service<D: DocumentDomain>(
    domain: D,
    embedder: EmbeddingProvider,
    settings: &VectorStoreSettings,
) -> RetrievalService<D> {
    let fallback = Arc::new(FallbackCorpus::for_domain(&domain));
    let name = domain.name();
    let service = RetrievalService::new(domain, embedder, fallback);

    match QdrantVectorStore::try_new(settings) {
        Ok(store) => {
            info!(
                target: "jurisearch::store",
                domain = name,
                collection = %settings.collection,
                "vector store configured"
            );
            service.with_store(Arc::new(store))
        }
        Err(err) => {
            info!(
                target: "jurisearch::store",
                domain = name,
                reason = %err,
                "operating in fallback corpus mode"
            );
            service
        }
    }
}

/// Run MCP server using stdio transport (stdin/stdout).
#[cfg(feature = "mcp-server")]
pub async fn run_mcp_stdio() -> Result<()> {
    init_tracing();

    let handles = build_environment().context("failed to bootstrap jurisearch environment")?;

    info!(
        target: "jurisearch::mcp",
        precedents_store = handles.precedents.has_store(),
        templates_store = handles.templates.has_store(),
        "Starting MCP stdio server (stdin/stdout transport)..."
    );

    interfaces::mcp::run_mcp_stdio_server(Arc::new(handles))
        .await
        .context("MCP stdio server failed")?;

    Ok(())
}

#[cfg(feature = "mcp-server")]
fn init_tracing() {
    static INIT: std::sync::OnceLock<()> = std::sync::OnceLock::new();

    let _ = INIT.get_or_init(|| {
        let filter = std::env::var("JURISEARCH_LOG").unwrap_or_else(|_| "info".into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
    });
}
