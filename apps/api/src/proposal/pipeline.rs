//! RFQ → proposal pipeline.
//!
//! Flow: extract text → generate proposal → review proposal → create remote
//! folder → upload version-1 JSON and DOCX → save document → save approval →
//! notify every user.
//!
//! Steps run strictly in sequence. A failure aborts the remaining steps;
//! remote folders, files and rows written by earlier steps are left in place.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::docx;
use crate::errors::AppError;
use crate::extract::{extract_text, ExtractError};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::document::{Approval, Document, Notification, Version, VersionContent};
use crate::proposal::generator::{generate_proposal, review_proposal};
use crate::proposal::prompts::ProposalPrompts;
use crate::repository::Repository;
use crate::sharepoint::{DocumentStore, StoreError};

/// Section title under which the generated proposal is stored.
pub const PROPOSAL_SECTION: &str = "Technical Proposal";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(#[from] LlmError),

    #[error("Invalid access token format")]
    InvalidCredential,

    #[error("Store operation failed: {0}")]
    StoreOperationFailed(StoreError),

    #[error("Processing failed: {0:#}")]
    ProcessingFailed(#[from] anyhow::Error),
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidCredential => PipelineError::InvalidCredential,
            other => PipelineError::StoreOperationFailed(other),
        }
    }
}

impl From<ExtractError> for PipelineError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFileType(media_type) => {
                PipelineError::UnsupportedFileType(media_type)
            }
            other => PipelineError::ProcessingFailed(other.into()),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NoFileUploaded => AppError::NoFileUploaded,
            PipelineError::UnsupportedFileType(_) => AppError::UnsupportedFileType,
            other => {
                error!("Error parsing document, generating or reviewing proposal: {other}");
                AppError::ProcessingFailed
            }
        }
    }
}

/// An RFQ received in a multipart upload, spooled to a temporary file.
pub struct UploadedFile {
    pub original_name: String,
    pub media_type: String,
    pub file: NamedTempFile,
}

#[derive(Debug, Clone)]
pub struct ProposalOutcome {
    pub document_id: Uuid,
    pub technical_proposal: String,
    pub proposal_review: String,
}

/// JSON artifact written next to each DOCX in the remote folder.
#[derive(Serialize)]
struct VersionArtifact<'a> {
    content: ArtifactContent<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactContent<'a> {
    technical_proposal: &'a str,
    sections: &'a BTreeMap<String, String>,
}

/// Strips the last extension segment: `RFQ.final.docx` → `RFQ.final`.
pub fn project_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() && !file_name[idx + 1..].contains('/') => {
            &file_name[..idx]
        }
        _ => file_name,
    }
}

pub struct ProposalPipeline<'a> {
    pub repo: &'a dyn Repository,
    pub llm: &'a dyn TextGenerator,
    pub store: &'a dyn DocumentStore,
    pub prompts: &'a ProposalPrompts,
}

impl ProposalPipeline<'_> {
    pub async fn run(
        &self,
        upload: Option<UploadedFile>,
        user: &AuthUser,
    ) -> Result<ProposalOutcome, PipelineError> {
        // Step 1: an upload is required
        let UploadedFile {
            original_name,
            media_type,
            file,
        } = upload.ok_or(PipelineError::NoFileUploaded)?;

        // Step 2: extract, then drop the temp file whatever the outcome
        let extracted = extract_text(file.path(), &media_type).await;
        let temp_path = file.path().to_path_buf();
        if let Err(e) = file.close() {
            warn!("Failed to remove upload {}: {e}", temp_path.display());
        }
        let rfq_text = extracted?;

        // Step 3: project name
        let project = project_name(&original_name).to_string();
        info!("Processing RFQ '{project}' ({media_type}) for {}", user.name);

        // Steps 4–5: generate and review
        let technical_proposal = generate_proposal(self.llm, self.prompts, &rfq_text).await?;
        let proposal_review =
            review_proposal(self.llm, self.prompts, &rfq_text, &technical_proposal).await?;

        // Step 6: unsaved document
        let document_name = format!("Technical Proposal - {project}");
        let mut document = Document::new(&document_name, user.id, self.llm.model());
        let version_number = document.next_version_number();
        let json_file = format!("version-{version_number}.json");
        let docx_file = format!("version-{version_number}.docx");

        // Step 7: remote folder named after the document
        let folder = document.folder_name();
        info!("Creating folder in SharePoint: {folder}");
        self.store.create_folder(&folder).await?;

        // Step 8: JSON metadata
        let sections = BTreeMap::from([(PROPOSAL_SECTION.to_string(), technical_proposal.clone())]);
        let artifact = serde_json::to_vec_pretty(&VersionArtifact {
            content: ArtifactContent {
                technical_proposal: &project,
                sections: &sections,
            },
        })
        .map_err(anyhow::Error::from)?;
        info!("Uploading JSON file to SharePoint: {json_file}");
        self.store
            .upload(&folder, &json_file, Bytes::from(artifact), "application/json")
            .await?;

        // Step 9: DOCX rendering
        let docx_bytes = docx::build_document(&technical_proposal)?;
        info!("Uploading DOCX file to SharePoint: {docx_file}");
        self.store
            .upload(&folder, &docx_file, Bytes::from(docx_bytes), docx::MEDIA_TYPE)
            .await?;

        // Step 10: first version, then persist
        document.push_version(Version {
            version_id: json_file,
            version_number,
            name: document_name,
            content: VersionContent {
                name: project,
                sections,
                proposal_review: Some(proposal_review.clone()),
            },
            last_modified: Utc::now(),
            docx_file,
        })?;
        self.repo.save_document(&document).await?;
        info!("Document {} saved", document.id);

        // Step 11: approval
        self.repo
            .save_approval(&Approval::for_document(&document))
            .await?;

        // Step 12: notify everyone in one batch
        let text = format!(
            "A new technical proposal has been generated from an RFQ by {}.",
            user.name
        );
        let notifications: Vec<Notification> = self
            .repo
            .list_users()
            .await?
            .into_iter()
            .map(|u| Notification {
                id: Uuid::new_v4(),
                user_id: u.id,
                document_id: document.id,
                text: text.clone(),
            })
            .collect();
        self.repo.insert_notifications(&notifications).await?;
        info!("Queued {} notification(s) for document {}", notifications.len(), document.id);

        Ok(ProposalOutcome {
            document_id: document.id,
            technical_proposal,
            proposal_review,
        })
    }
}
