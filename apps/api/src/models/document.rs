use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a generated document. This service only ever writes `Draft`;
/// later transitions belong to the approval workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::InReview => "in_review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "draft" => DocumentStatus::Draft,
            "in_review" => DocumentStatus::InReview,
            "approved" => DocumentStatus::Approved,
            "rejected" => DocumentStatus::Rejected,
            other => bail!("unknown document status '{other}'"),
        })
    }
}

/// Generated content carried by a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionContent {
    /// Project name derived from the uploaded RFQ's file name.
    pub name: String,
    /// Section title → generated text.
    pub sections: BTreeMap<String, String>,
    pub proposal_review: Option<String>,
}

/// One immutable snapshot of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Name of the JSON artifact in the remote folder.
    pub version_id: String,
    pub version_number: i32,
    pub name: String,
    pub content: VersionContent,
    pub last_modified: DateTime<Utc>,
    /// Name of the DOCX artifact in the remote folder.
    pub docx_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub creator: Uuid,
    pub used_model: String,
    pub current_status: DocumentStatus,
    pub versions: Vec<Version>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Builds an unsaved document with a fresh identity and no versions.
    pub fn new(name: impl Into<String>, creator: Uuid, used_model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            creator,
            used_model: used_model.into(),
            current_status: DocumentStatus::Draft,
            versions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The remote folder holding this document's artifacts.
    pub fn folder_name(&self) -> String {
        self.id.to_string()
    }

    /// Version numbers start at 1 and grow by one per appended version.
    pub fn next_version_number(&self) -> i32 {
        self.versions
            .last()
            .map(|v| v.version_number + 1)
            .unwrap_or(1)
    }

    /// Appends a version. Numbers must be strictly increasing.
    pub fn push_version(&mut self, version: Version) -> Result<()> {
        let expected = self.next_version_number();
        if version.version_number != expected {
            bail!(
                "version {} out of sequence for document {} (expected {expected})",
                version.version_number,
                self.id
            );
        }
        self.versions.push(version);
        Ok(())
    }

    /// A document is only persisted once it carries at least one version.
    pub fn ensure_persistable(&self) -> Result<()> {
        if self.versions.is_empty() {
            bail!("document {} has no versions", self.id);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: Uuid,
    pub document_id: Uuid,
    pub status: DocumentStatus,
}

impl Approval {
    /// An approval opened for a freshly generated document mirrors its status.
    pub fn for_document(document: &Document) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document.id,
            status: document.current_status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_id: Uuid,
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Row types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub name: String,
    pub creator_id: Uuid,
    pub used_model: String,
    pub current_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct VersionRow {
    pub version_number: i32,
    pub version_id: String,
    pub name: String,
    pub content: Value,
    pub docx_file: String,
    pub last_modified: DateTime<Utc>,
}

impl VersionRow {
    pub fn into_version(self) -> Result<Version> {
        Ok(Version {
            version_id: self.version_id,
            version_number: self.version_number,
            name: self.name,
            content: serde_json::from_value(self.content)?,
            last_modified: self.last_modified,
            docx_file: self.docx_file,
        })
    }
}

impl DocumentRow {
    pub fn into_document(self, versions: Vec<Version>) -> Result<Document> {
        Ok(Document {
            id: self.id,
            name: self.name,
            creator: self.creator_id,
            used_model: self.used_model,
            current_status: DocumentStatus::parse(&self.current_status)?,
            versions,
            created_at: self.created_at,
        })
    }
}
