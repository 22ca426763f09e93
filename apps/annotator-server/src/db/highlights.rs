//! Highlights database operations

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Rectangle in unscaled page coordinates (zoom 1.0, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Finite coordinates and a non-negative size
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// Highlight record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    /// Owning user id
    pub user: String,
    /// Document UUID
    pub pdf: String,
    /// 1-indexed page number
    pub page: i64,
    pub text: String,
    pub bounding_box: BoundingBox,
    pub timestamp: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct HighlightRow {
    id: String,
    user_id: String,
    pdf: String,
    page: i64,
    text: String,
    box_x: f64,
    box_y: f64,
    box_width: f64,
    box_height: f64,
    timestamp: String,
}

impl TryFrom<HighlightRow> for Highlight {
    type Error = AppError;

    fn try_from(row: HighlightRow) -> Result<Self> {
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| AppError::Internal(format!("Bad timestamp on highlight {}: {}", row.id, e)))?
            .with_timezone(&Utc);

        Ok(Highlight {
            id: row.id,
            user: row.user_id,
            pdf: row.pdf,
            page: row.page,
            text: row.text,
            bounding_box: BoundingBox {
                x: row.box_x,
                y: row.box_y,
                width: row.box_width,
                height: row.box_height,
            },
            timestamp,
        })
    }
}

/// Create highlight request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHighlight {
    pub pdf: String,
    pub page: i64,
    pub text: String,
    pub bounding_box: BoundingBox,
    pub timestamp: Option<DateTime<Utc>>,
}

impl CreateHighlight {
    pub fn validate(&self) -> Result<()> {
        if self.pdf.trim().is_empty() {
            return Err(AppError::BadRequest("pdf is required".to_string()));
        }
        validate_page(self.page)?;
        validate_text(&self.text)?;
        validate_box(&self.bounding_box)
    }
}

/// Update highlight request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHighlight {
    pub page: Option<i64>,
    pub text: Option<String>,
    pub bounding_box: Option<BoundingBox>,
}

impl UpdateHighlight {
    pub fn validate(&self) -> Result<()> {
        if let Some(page) = self.page {
            validate_page(page)?;
        }
        if let Some(ref text) = self.text {
            validate_text(text)?;
        }
        if let Some(ref bbox) = self.bounding_box {
            validate_box(bbox)?;
        }
        Ok(())
    }
}

/// Pages are 1-indexed and must fit the client's `u32`
fn validate_page(page: i64) -> Result<()> {
    if page < 1 {
        return Err(AppError::BadRequest("page must be 1 or greater".to_string()));
    }
    if page > i64::from(u32::MAX) {
        return Err(AppError::BadRequest("page is out of range".to_string()));
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(AppError::BadRequest("text is required".to_string()));
    }
    Ok(())
}

fn validate_box(bbox: &BoundingBox) -> Result<()> {
    if !bbox.is_valid() {
        return Err(AppError::BadRequest("boundingBox is invalid".to_string()));
    }
    Ok(())
}

/// Highlight repository, every query scoped to the owning user
pub struct HighlightRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HighlightRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific highlight
    pub async fn get(&self, id: &str, user_id: &str) -> Result<Option<Highlight>> {
        let row = sqlx::query_as::<_, HighlightRow>(
            r#"
            SELECT id, user_id, pdf, page, text, box_x, box_y, box_width, box_height, timestamp
            FROM highlights
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Highlight::try_from).transpose()
    }

    /// List highlights for a document in creation order
    pub async fn list_for_pdf(&self, pdf: &str, user_id: &str) -> Result<Vec<Highlight>> {
        let rows = sqlx::query_as::<_, HighlightRow>(
            r#"
            SELECT id, user_id, pdf, page, text, box_x, box_y, box_width, box_height, timestamp
            FROM highlights
            WHERE pdf = ? AND user_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(pdf)
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Highlight::try_from).collect()
    }

    /// Create a new highlight
    pub async fn create(&self, user_id: &str, data: &CreateHighlight) -> Result<Highlight> {
        let id = Uuid::new_v4().to_string();
        let timestamp = data.timestamp.unwrap_or_else(Utc::now);

        sqlx::query(
            r#"
            INSERT INTO highlights (id, user_id, pdf, page, text, box_x, box_y, box_width, box_height, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&data.pdf)
        .bind(data.page)
        .bind(&data.text)
        .bind(data.bounding_box.x)
        .bind(data.bounding_box.y)
        .bind(data.bounding_box.width)
        .bind(data.bounding_box.height)
        .bind(timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(self.pool)
        .await?;

        self.get(&id, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created highlight".to_string()))
    }

    /// Update a highlight
    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        data: &UpdateHighlight,
    ) -> Result<Option<Highlight>> {
        let Some(mut highlight) = self.get(id, user_id).await? else {
            return Ok(None);
        };

        if let Some(page) = data.page {
            highlight.page = page;
        }
        if let Some(ref text) = data.text {
            highlight.text = text.clone();
        }
        if let Some(bbox) = data.bounding_box {
            highlight.bounding_box = bbox;
        }

        sqlx::query(
            r#"
            UPDATE highlights
            SET page = ?, text = ?, box_x = ?, box_y = ?, box_width = ?, box_height = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(highlight.page)
        .bind(&highlight.text)
        .bind(highlight.bounding_box.x)
        .bind(highlight.bounding_box.y)
        .bind(highlight.bounding_box.width)
        .bind(highlight.bounding_box.height)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(Some(highlight))
    }

    /// Delete a highlight
    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
