//! Admin views over the proposal folders kept in the remote store.

use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::Role;
use crate::sharepoint::{DriveItem, StoreError};
use crate::state::AppState;

const ADMIN_ROLES: &[Role] = &[Role::Admin];

#[derive(Debug, Serialize)]
pub struct FolderListing {
    pub folders: Vec<DriveItem>,
}

/// GET /api/v1/folders
pub async fn handle_list_folders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<FolderListing>, AppError> {
    user.require_role(ADMIN_ROLES)?;

    let folders = state
        .store
        .list_children()
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .into_iter()
        .filter(DriveItem::is_folder)
        .collect();

    Ok(Json(FolderListing { folders }))
}

/// DELETE /api/v1/folders/:name
///
/// Removes a proposal folder and everything in it. Database rows are left alone.
pub async fn handle_delete_folder(
    State(state): State<AppState>,
    user: AuthUser,
    UrlPath(name): UrlPath<String>,
) -> Result<StatusCode, AppError> {
    user.require_role(ADMIN_ROLES)?;

    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(AppError::Validation(format!("Invalid folder name: {name}")));
    }

    state.store.delete_item(&name).await.map_err(|e| match e {
        StoreError::Operation { status: 404, .. } => {
            AppError::NotFound(format!("Folder {name} not found"))
        }
        other => AppError::Internal(other.into()),
    })?;

    info!("Folder {name} deleted by {}", user.name);
    Ok(StatusCode::NO_CONTENT)
}
