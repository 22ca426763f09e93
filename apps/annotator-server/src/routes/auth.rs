//! Auth API routes
//!
//! - POST /signup - register an email/password pair
//! - POST /login  - exchange credentials for a session token

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, issue_token, validate_email, verify_password};
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Login/signup request body
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Create the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Register a new user
async fn signup(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    validate_email(&body.email)?;
    if body.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    let password = body.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

    let user = UserRepository::new(state.db())
        .create(&body.email, &password_hash)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created".to_string(),
        }),
    ))
}

/// Exchange credentials for a session token
async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<LoginResponse>> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = UserRepository::new(state.db())
        .find_by_email(&body.email)
        .await?
        .ok_or_else(invalid)?;

    let password = body.password;
    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?;

    if !matches {
        tracing::debug!(user_id = %user.id, "Login rejected");
        return Err(invalid());
    }

    let auth = &state.config().auth;
    let token = issue_token(&user.id, &user.email, &auth.jwt_secret, auth.token_ttl_hours)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse { token }))
}
