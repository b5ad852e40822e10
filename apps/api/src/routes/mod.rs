pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::proposal::handlers;
use crate::sharepoint::handlers as folders;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // RFQ → proposal pipeline
        .route("/api/v1/rfq/parse", post(handlers::handle_parse_rfq))
        // Generated documents
        .route("/api/v1/documents/:id", get(handlers::handle_get_document))
        .route(
            "/api/v1/documents/:id/versions/:number",
            get(handlers::handle_get_version_content),
        )
        // Remote proposal folders (admin)
        .route("/api/v1/folders", get(folders::handle_list_folders))
        .route("/api/v1/folders/:name", delete(folders::handle_delete_folder))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
