use crate::services::sessions::Sessions;
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Roles carried by an authenticated request
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    /// Whether the session may modify data
    pub admin: bool,
    /// Whether the session may view data
    pub guest: bool,
}

/// Extractor requiring any valid session, admin or guest
pub struct Auth(pub AuthContext);
/// Extractor requiring an admin session
pub struct AdminAuth(pub AuthContext);

/// The HTTP header that contains the authentication token
const TOKEN_HEADER: &str = "X-Token";

impl<S> FromRequestParts<S> for Auth {
    type Rejection = TokenError;

    fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let sessions = parts
            .extensions
            .get::<Arc<Sessions>>()
            .expect("Sessions extension missing")
            .clone();

        // Extract the token from the headers and look up its session
        let session = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(TokenError::MissingToken)
            .and_then(|token| sessions.get(token).ok_or(TokenError::InvalidToken));

        Box::pin(async move {
            let session = session?;
            Ok(Self(AuthContext {
                admin: session.admin,
                guest: session.guest,
            }))
        })
    }
}

impl<S> FromRequestParts<S> for AdminAuth {
    type Rejection = TokenError;

    fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let auth = Auth::from_request_parts(parts, state);
        Box::pin(async move {
            let Auth(context) = auth.await?;
            if !context.admin {
                return Err(TokenError::MissingRole);
            }
            Ok(AdminAuth(context))
        })
    }
}

/// Error type used by the token checking middleware to handle
/// different errors and create error response based on them
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token header was not provided on the request
    #[error("Missing token")]
    MissingToken,
    /// The provided token was not a valid token
    #[error("Invalid token")]
    InvalidToken,
    /// The session doesn't carry the admin role
    #[error("This action is only available to the team admin")]
    MissingRole,
}

/// IntoResponse implementation for TokenError to allow it to be
/// used within the result type as a error response
impl IntoResponse for TokenError {
    #[inline]
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingToken => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::MissingRole => StatusCode::FORBIDDEN,
        };

        (status, Body::from(self.to_string())).into_response()
    }
}
