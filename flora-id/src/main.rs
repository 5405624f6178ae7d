//! flora-id (Plant Identification) - Main entry point
//!
//! Loads the classifier, taxonomy table and botanical knowledge base once,
//! then serves the upload page and identification endpoint.
//!
//! Startup failures (bad config, missing model or knowledge file) terminate
//! the process before any traffic is accepted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use flora_common::config::TomlConfig;
use flora_common::logging::init_tracing;
use tokio::signal;
use tracing::{error, info};

use flora_id::analysis::Analyzer;
use flora_id::knowledge::KnowledgeStore;
use flora_id::model::OnnxClassifier;
use flora_id::taxonomy::TaxonomyTable;
use flora_id::{build_router, AppState};

/// Command-line arguments for flora-id
///
/// Values given here override the TOML config file.
#[derive(Parser, Debug)]
#[command(name = "flora-id")]
#[command(about = "Plant identification service")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "FLORA_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FLORA_PORT")]
    port: Option<u16>,

    /// ONNX classifier artifact
    #[arg(short, long, env = "FLORA_MODEL")]
    model: Option<PathBuf>,

    /// Botanical knowledge base (JSON)
    #[arg(short, long, env = "FLORA_KNOWLEDGE")]
    knowledge: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut config: TomlConfig) -> TomlConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = self.model {
            config.model_path = model;
        }
        if let Some(knowledge) = self.knowledge {
            config.knowledge_path = knowledge;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) = TomlConfig::resolve_and_load(args.config.as_deref(), "flora-id")
        .context("Failed to load configuration")?;
    let config = args.apply(config);

    init_tracing(&config.logging, &["flora_id", "flora_common"])
        .context("Failed to initialize logging")?;

    info!(
        "Starting Flora Plant Identification (flora-id) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_source.log("flora-id");

    let classifier = match OnnxClassifier::load(&config.model_path, config.intra_threads) {
        Ok(classifier) => {
            info!("✓ Classifier loaded from {}", classifier.path().display());
            classifier
        }
        Err(e) => {
            error!("Failed to load classifier: {}", e);
            return Err(e.into());
        }
    };

    let knowledge = match KnowledgeStore::load(&config.knowledge_path) {
        Ok(knowledge) => {
            info!("✓ Knowledge base loaded ({} entries)", knowledge.len());
            knowledge
        }
        Err(e) => {
            error!("Failed to load knowledge base: {}", e);
            return Err(e.into());
        }
    };

    let taxonomy = TaxonomyTable::builtin();
    info!("Taxonomy table: {} classes", taxonomy.len());

    let analyzer = Analyzer::new(Arc::new(classifier), Arc::new(taxonomy), Arc::new(knowledge));
    let state = AppState::new(analyzer).with_max_upload_bytes(config.max_upload_bytes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", config.host, config.port))?;
    let addr = listener.local_addr()?;
    info!("flora-id listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
