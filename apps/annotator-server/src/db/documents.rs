//! Uploaded PDF metadata database operations

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::Result;

/// PDF document record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PdfDocument {
    pub uuid: String,
    pub user_id: String,
    /// Object storage key
    pub filename: String,
    /// Name shown to the user
    pub originalname: String,
    pub upload_date: String,
}

/// PDF document repository
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DocumentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a document owned by the user
    pub async fn get(&self, uuid: &str, user_id: &str) -> Result<Option<PdfDocument>> {
        let doc = sqlx::query_as::<_, PdfDocument>(
            r#"
            SELECT uuid, user_id, filename, originalname, upload_date
            FROM pdfs
            WHERE uuid = ? AND user_id = ?
            "#,
        )
        .bind(uuid)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(doc)
    }

    /// List the user's documents, newest upload first
    pub async fn list(&self, user_id: &str) -> Result<Vec<PdfDocument>> {
        let docs = sqlx::query_as::<_, PdfDocument>(
            r#"
            SELECT uuid, user_id, filename, originalname, upload_date
            FROM pdfs
            WHERE user_id = ?
            ORDER BY upload_date DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(docs)
    }

    /// Record a new upload
    pub async fn create(
        &self,
        uuid: &str,
        user_id: &str,
        filename: &str,
        originalname: &str,
    ) -> Result<PdfDocument> {
        let doc = PdfDocument {
            uuid: uuid.to_string(),
            user_id: user_id.to_string(),
            filename: filename.to_string(),
            originalname: originalname.to_string(),
            upload_date: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        sqlx::query(
            r#"
            INSERT INTO pdfs (uuid, user_id, filename, originalname, upload_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&doc.uuid)
        .bind(&doc.user_id)
        .bind(&doc.filename)
        .bind(&doc.originalname)
        .bind(&doc.upload_date)
        .execute(self.pool)
        .await?;

        Ok(doc)
    }

    /// Change the display name
    pub async fn rename(
        &self,
        uuid: &str,
        user_id: &str,
        new_name: &str,
    ) -> Result<Option<PdfDocument>> {
        let result = sqlx::query("UPDATE pdfs SET originalname = ? WHERE uuid = ? AND user_id = ?")
            .bind(new_name)
            .bind(uuid)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(uuid, user_id).await
    }

    /// Delete a document and its highlights, returning the removed record
    pub async fn delete(&self, uuid: &str, user_id: &str) -> Result<Option<PdfDocument>> {
        let Some(doc) = self.get(uuid, user_id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM highlights WHERE pdf = ? AND user_id = ?")
            .bind(uuid)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM pdfs WHERE uuid = ? AND user_id = ?")
            .bind(uuid)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(doc))
    }
}
