mod auth;
mod config;
mod db;
mod docx;
mod errors;
mod extract;
mod llm_client;
mod models;
mod proposal;
mod repository;
mod routes;
mod sharepoint;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::proposal::prompts::ProposalPrompts;
use crate::repository::PgRepository;
use crate::routes::build_router;
use crate::sharepoint::auth::ClientCredentialsProvider;
use crate::sharepoint::SharePointClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bid API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone(), config.openai_base_url.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize SharePoint store
    let http = reqwest::Client::new();
    let tokens = ClientCredentialsProvider::new(
        http.clone(),
        &config.sharepoint_tenant_id,
        config.sharepoint_client_id.clone(),
        config.sharepoint_client_secret.clone(),
    );
    let store = SharePointClient::new(
        http,
        &config.graph_base_url,
        &config.sharepoint_site_id,
        config.sharepoint_root_folder.clone(),
        Arc::new(tokens),
    );
    info!(
        "SharePoint store initialized (root folder: {})",
        config.sharepoint_root_folder
    );

    let prompts = ProposalPrompts::load(
        config.proposal_prompt_path.as_deref(),
        config.review_prompt_path.as_deref(),
    )?;

    // Build app state
    let state = AppState {
        repo: Arc::new(PgRepository::new(db)),
        llm: Arc::new(llm),
        store: Arc::new(store),
        prompts: Arc::new(prompts),
        jwt_secret: config.jwt_secret.clone(),
        upload_dir: config.upload_dir.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the bid portal origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
