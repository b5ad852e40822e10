//! Persistence for documents, approvals and notifications.
//!
//! `AppState` holds an `Arc<dyn Repository>`; production uses `PgRepository`.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::document::{Approval, Document, DocumentRow, Notification, VersionRow};
use crate::models::user::UserRow;

#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRow>>;

    async fn list_users(&self) -> Result<Vec<UserRow>>;

    /// Inserts the document row and all of its versions atomically.
    /// Fails for a document that has no versions.
    async fn save_document(&self, document: &Document) -> Result<()>;

    async fn save_approval(&self, approval: &Approval) -> Result<()>;

    /// Inserts every notification in a single statement.
    async fn insert_notifications(&self, notifications: &[Notification]) -> Result<()>;

    /// Loads a document with its versions ordered by number.
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>>;
}

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_users(&self) -> Result<Vec<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn save_document(&self, document: &Document) -> Result<()> {
        document.ensure_persistable()?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, name, creator_id, used_model, current_status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(document.id)
        .bind(&document.name)
        .bind(document.creator)
        .bind(&document.used_model)
        .bind(document.current_status.as_str())
        .bind(document.created_at)
        .execute(&mut *tx)
        .await?;

        for version in &document.versions {
            sqlx::query(
                r#"
                INSERT INTO document_versions
                    (document_id, version_number, version_id, name, content, docx_file, last_modified)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(document.id)
            .bind(version.version_number)
            .bind(&version.version_id)
            .bind(&version.name)
            .bind(serde_json::to_value(&version.content)?)
            .bind(&version.docx_file)
            .bind(version.last_modified)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Saved document {} with {} version(s)",
            document.id,
            document.versions.len()
        );
        Ok(())
    }

    async fn save_approval(&self, approval: &Approval) -> Result<()> {
        sqlx::query("INSERT INTO approvals (id, document_id, status) VALUES ($1, $2, $3)")
            .bind(approval.id)
            .bind(approval.document_id)
            .bind(approval.status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_notifications(&self, notifications: &[Notification]) -> Result<()> {
        if notifications.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = notifications.iter().map(|n| n.id).collect();
        let users: Vec<Uuid> = notifications.iter().map(|n| n.user_id).collect();
        let documents: Vec<Uuid> = notifications.iter().map(|n| n.document_id).collect();
        let texts: Vec<String> = notifications.iter().map(|n| n.text.clone()).collect();

        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, document_id, text)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::uuid[], $4::text[])
            "#,
        )
        .bind(&ids)
        .bind(&users)
        .bind(&documents)
        .bind(&texts)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        let Some(row) = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, name, creator_id, used_model, current_status, created_at FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let versions = sqlx::query_as::<_, VersionRow>(
            r#"
            SELECT version_number, version_id, name, content, docx_file, last_modified
            FROM document_versions
            WHERE document_id = $1
            ORDER BY version_number ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(VersionRow::into_version)
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(row.into_document(versions)?))
    }
}
