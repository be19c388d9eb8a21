use crate::{config::Config, services::sessions::Sessions};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /api/auth
pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/guest", post(guest))
        .route("/logout", post(logout))
}

/// Enum for errors that could occur when accessing any of
/// the auth routes
#[derive(Debug, Error)]
enum AuthError {
    /// The provided credentials didn't match the configured admin
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Request to create an admin session
#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// Response containing the session token for an issued session
#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

/// POST /api/auth/login
///
/// Compares the provided credentials against the configured admin
/// account and issues an admin session token on a match
async fn login(
    Extension(config): Extension<Arc<Config>>,
    Extension(sessions): Extension<Arc<Sessions>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    if !config.admin.matches(&req.username, &req.password) {
        return Err(AuthError::InvalidCredentials);
    }

    let token = sessions.create_admin();
    Ok(Json(TokenResponse { token }))
}

/// POST /api/auth/guest
///
/// Issues a read-only guest session token, no credentials required
async fn guest(Extension(sessions): Extension<Arc<Sessions>>) -> Json<TokenResponse> {
    let token = sessions.create_guest();
    Json(TokenResponse { token })
}

/// POST /api/auth/logout
///
/// Removes the session behind the provided token. Always succeeds,
/// logging out an unknown token is a no-op.
async fn logout(
    Extension(sessions): Extension<Arc<Sessions>>,
    headers: HeaderMap,
) -> StatusCode {
    if let Some(token) = headers.get("X-Token").and_then(|value| value.to_str().ok()) {
        sessions.remove(token);
    }
    StatusCode::OK
}

/// IntoResponse implementation for AuthError to allow it to be
/// used within the result type as a error response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
        };

        (status, self.to_string()).into_response()
    }
}
