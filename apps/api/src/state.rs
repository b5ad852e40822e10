use std::path::PathBuf;
use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::proposal::prompts::ProposalPrompts;
use crate::repository::Repository;
use crate::sharepoint::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub llm: Arc<dyn TextGenerator>,
    /// Remote artifact store. Production: SharePoint over Microsoft Graph.
    pub store: Arc<dyn DocumentStore>,
    pub prompts: Arc<ProposalPrompts>,
    /// HS256 secret shared with the account service that issues tokens.
    pub jwt_secret: String,
    /// Where multipart uploads are spooled until text extraction finishes.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}
