//! Highlights API routes
//!
//! Every route is scoped to the authenticated caller:
//! - POST   /      - create a highlight
//! - GET    /:pdf  - list highlights for a document
//! - PUT    /:id   - partial update
//! - DELETE /:id   - delete

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::auth::AuthUser;
use crate::db::{CreateHighlight, Highlight, HighlightRepository, UpdateHighlight};
use crate::error::{AppError, Result};
use crate::routes::auth::MessageResponse;
use crate::state::AppState;

/// Create the highlights router
pub fn router() -> Router<AppState> {
    // `/:key` is a document UUID for GET and a highlight id for PUT/DELETE
    Router::new()
        .route("/", post(create_highlight))
        .route(
            "/:key",
            get(list_pdf_highlights)
                .put(update_highlight)
                .delete(delete_highlight),
        )
}

/// Create a new highlight
async fn create_highlight(
    State(state): State<AppState>,
    user: AuthUser,
    Json(data): Json<CreateHighlight>,
) -> Result<(StatusCode, Json<Highlight>)> {
    data.validate()?;

    let repo = HighlightRepository::new(state.db());
    let highlight = repo.create(&user.user_id, &data).await?;

    tracing::debug!(
        highlight_id = %highlight.id,
        pdf = %highlight.pdf,
        page = highlight.page,
        "Highlight created"
    );

    Ok((StatusCode::CREATED, Json(highlight)))
}

/// List the caller's highlights for a document
async fn list_pdf_highlights(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pdf): Path<String>,
) -> Result<Json<Vec<Highlight>>> {
    let repo = HighlightRepository::new(state.db());
    let highlights = repo.list_for_pdf(&pdf, &user.user_id).await?;
    Ok(Json(highlights))
}

/// Update a highlight
async fn update_highlight(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateHighlight>,
) -> Result<Json<Highlight>> {
    data.validate()?;

    let repo = HighlightRepository::new(state.db());
    let highlight = repo
        .update(&id, &user.user_id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound("Highlight not found".to_string()))?;
    Ok(Json(highlight))
}

/// Delete a highlight
async fn delete_highlight(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let repo = HighlightRepository::new(state.db());
    if !repo.delete(&id, &user.user_id).await? {
        return Err(AppError::NotFound("Highlight not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Highlight deleted".to_string(),
    }))
}
