//! Axum route handlers for RFQ processing and generated documents.

use std::path::Path;

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, Path as UrlPath, State,
    },
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::document::Document;
use crate::models::user::Role;
use crate::proposal::pipeline::{ProposalPipeline, UploadedFile};
use crate::sharepoint::StoreError;
use crate::state::AppState;

/// Multipart field carrying the RFQ.
const UPLOAD_FIELD: &str = "document";

/// Roles allowed to generate proposals.
const GENERATOR_ROLES: &[Role] = &[Role::Admin, Role::BidCreator];

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRfqResponse {
    pub message: String,
    pub document_id: Uuid,
    pub technical_proposal: String,
    pub proposal_review: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rfq/parse
///
/// Multipart upload of an RFQ (PDF, DOCX or plain text). Generates and
/// reviews a technical proposal, stores both artifacts remotely and records
/// the document, its approval and a notification for every user.
/// A request that is not a multipart form counts as carrying no file.
pub async fn handle_parse_rfq(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ParseRfqResponse>, AppError> {
    user.require_role(GENERATOR_ROLES)?;

    let upload = match multipart {
        Ok(mut multipart) => read_upload(&mut multipart, &state.upload_dir).await?,
        Err(rejection) => {
            debug!("Request is not a multipart form: {rejection}");
            None
        }
    };

    let pipeline = ProposalPipeline {
        repo: state.repo.as_ref(),
        llm: state.llm.as_ref(),
        store: state.store.as_ref(),
        prompts: state.prompts.as_ref(),
    };
    let outcome = pipeline.run(upload, &user).await?;

    Ok(Json(ParseRfqResponse {
        message: "Document parsed, proposal generated, reviewed, and saved successfully"
            .to_string(),
        document_id: outcome.document_id,
        technical_proposal: outcome.technical_proposal,
        proposal_review: outcome.proposal_review,
    }))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    _user: AuthUser,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Document>, AppError> {
    let document = state
        .repo
        .get_document(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;
    Ok(Json(document))
}

/// GET /api/v1/documents/:id/versions/:number
///
/// Reads the version's JSON artifact back from the remote store.
pub async fn handle_get_version_content(
    State(state): State<AppState>,
    _user: AuthUser,
    UrlPath((id, number)): UrlPath<(Uuid, i32)>,
) -> Result<Json<Value>, AppError> {
    let document = state
        .repo
        .get_document(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;

    let version = document
        .versions
        .iter()
        .find(|v| v.version_number == number)
        .ok_or_else(|| AppError::NotFound(format!("Version {number} of document {id} not found")))?;

    let content = state
        .store
        .read_json(&document.folder_name(), &version.version_id)
        .await
        .map_err(|e| match e {
            StoreError::Operation { status: 404, .. } => {
                AppError::NotFound(format!("Artifact {} not found", version.version_id))
            }
            other => AppError::Internal(other.into()),
        })?;

    Ok(Json(content))
}

// ────────────────────────────────────────────────────────────────────────────
// Upload spooling
// ────────────────────────────────────────────────────────────────────────────

/// Finds the RFQ field and spools it to a temp file in `upload_dir`.
/// Returns `None` when the form has no such field.
async fn read_upload(
    multipart: &mut Multipart,
    upload_dir: &Path,
) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return spool_field(field, upload_dir).await.map(Some);
        }
    }
    Ok(None)
}

async fn spool_field(mut field: Field<'_>, upload_dir: &Path) -> Result<UploadedFile, AppError> {
    let original_name = field.file_name().unwrap_or(UPLOAD_FIELD).to_string();
    let media_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(anyhow::Error::from)?;
    let file = NamedTempFile::new_in(upload_dir).map_err(anyhow::Error::from)?;
    let mut out = tokio::fs::File::from_std(file.reopen().map_err(anyhow::Error::from)?);

    while let Some(chunk) = field.chunk().await? {
        out.write_all(&chunk).await.map_err(anyhow::Error::from)?;
    }
    out.flush().await.map_err(anyhow::Error::from)?;

    Ok(UploadedFile {
        original_name,
        media_type,
        file,
    })
}
