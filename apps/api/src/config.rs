use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub graph_base_url: String,
    pub sharepoint_site_id: String,
    pub sharepoint_tenant_id: String,
    pub sharepoint_client_id: String,
    pub sharepoint_client_secret: String,
    pub sharepoint_root_folder: String,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub proposal_prompt_path: Option<PathBuf>,
    pub review_prompt_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            graph_base_url: env_or("GRAPH_BASE_URL", "https://graph.microsoft.com/v1.0"),
            sharepoint_site_id: require_env("SHAREPOINT_SITE_ID")?,
            sharepoint_tenant_id: require_env("SHAREPOINT_TENANT_ID")?,
            sharepoint_client_id: require_env("SHAREPOINT_CLIENT_ID")?,
            sharepoint_client_secret: require_env("SHAREPOINT_CLIENT_SECRET")?,
            sharepoint_root_folder: env_or("SHAREPOINT_ROOT_FOLDER", "SharePointTest"),
            jwt_secret: require_env("JWT_SECRET")?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            proposal_prompt_path: std::env::var("PROPOSAL_PROMPT_PATH").ok().map(PathBuf::from),
            review_prompt_path: std::env::var("REVIEW_PROMPT_PATH").ok().map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
