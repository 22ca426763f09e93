//! Request extractor resolving the authenticated caller

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::state::AppState;

use super::token::{token_from_header, verify_token};

/// The user a request acts on behalf of
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(token_from_header)
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

        let claims = verify_token(token, &state.config().auth.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            AppError::Unauthorized("Invalid token".to_string())
        })?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}
