//! PDF document routes
//!
//! Uploads go to object storage; metadata lives in SQLite. All routes are
//! scoped to the authenticated caller.
//!
//! - POST   /upload - multipart upload, field `file`
//! - GET    /       - list, newest first
//! - GET    /:uuid  - download
//! - PUT    /:uuid  - rename (`{ "newName": ... }`)
//! - DELETE /:uuid  - delete file, record, and its highlights

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::{DocumentRepository, PdfDocument};
use crate::error::{AppError, Result};
use crate::routes::auth::MessageResponse;
use crate::state::AppState;
use crate::storage::{object_key, S3Client};

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub uuid: String,
    pub filename: String,
    pub originalname: String,
}

/// Rename request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub new_name: String,
}

/// Create the documents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_documents))
        .route("/upload", post(upload_document))
        .route(
            "/:uuid",
            get(download_document)
                .put(rename_document)
                .delete(delete_document),
        )
        // Allow up to 100MB uploads
        .layer(DefaultBodyLimit::max(100 * 1024 * 1024))
}

/// Upload a PDF
async fn upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read upload: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let originalname = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "document.pdf".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| {
                mime_guess::from_path(&originalname)
                    .first_or_octet_stream()
                    .to_string()
            });

        let data = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file data: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        let uuid = Uuid::new_v4().to_string();
        let key = object_key(&uuid, &originalname);

        tracing::info!(
            user_id = %user.user_id,
            key = %key,
            content_type = %content_type,
            size = data.len(),
            "Uploading PDF"
        );

        // Object first, then the row that references it
        state
            .s3_client()
            .put_object(&key, data.to_vec(), &content_type)
            .await?;

        let doc = match DocumentRepository::new(state.db())
            .create(&uuid, &user.user_id, &key, &originalname)
            .await
        {
            Ok(doc) => doc,
            Err(e) => return Err(discard_orphan(state.s3_client(), &key, e).await),
        };

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                uuid: doc.uuid,
                filename: doc.filename,
                originalname: doc.originalname,
            }),
        ));
    }

    tracing::warn!("No file field found in multipart upload");
    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// List the caller's PDFs, newest first
async fn list_documents(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PdfDocument>>> {
    let docs = DocumentRepository::new(state.db()).list(&user.user_id).await?;
    Ok(Json(docs))
}

/// Download a PDF
async fn download_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<String>,
) -> Result<Response> {
    let doc = DocumentRepository::new(state.db())
        .get(&uuid, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("PDF not found".to_string()))?;

    let object = state.s3_client().get_object(&doc.filename).await?;

    let content_type = object
        .metadata
        .content_type
        .unwrap_or_else(|| "application/pdf".to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, object.data.len())
        .header(header::CONTENT_DISPOSITION, content_disposition(&doc.originalname))
        .body(Body::from(object.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Rename a PDF
async fn rename_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<PdfDocument>> {
    let new_name = body.new_name.trim();
    if new_name.is_empty() {
        return Err(AppError::BadRequest("newName is required".to_string()));
    }

    let doc = DocumentRepository::new(state.db())
        .rename(&uuid, &user.user_id, new_name)
        .await?
        .ok_or_else(|| AppError::NotFound("PDF not found".to_string()))?;

    Ok(Json(doc))
}

/// Delete a PDF, its stored object, and its highlights
async fn delete_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uuid): Path<String>,
) -> Result<Json<MessageResponse>> {
    let doc = DocumentRepository::new(state.db())
        .delete(&uuid, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("PDF not found".to_string()))?;

    state.s3_client().delete_object(&doc.filename).await?;

    tracing::info!(user_id = %user.user_id, uuid = %doc.uuid, "PDF deleted");

    Ok(Json(MessageResponse {
        message: "PDF deleted".to_string(),
    }))
}

/// Best-effort removal of an uploaded object whose record was never written.
///
/// Returns the error that caused the rollback.
async fn discard_orphan(s3: &S3Client, key: &str, cause: AppError) -> AppError {
    tracing::warn!(key = %key, "Recording upload failed, removing stored object: {}", cause);
    if let Err(e) = s3.delete_object(key).await {
        tracing::error!(key = %key, "Failed to remove orphaned object: {}", e);
    }
    cause
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}
