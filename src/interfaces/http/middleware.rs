//! Authentication middleware for Axum
//!
//! Verifies the `Authorization: Bearer <jwt>` header and stores the
//! resulting [`AuthenticatedUser`] in the request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::common::ApiResponse;
use crate::domain::Actor;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};

/// Authentication error types
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    UnknownRole,
}

/// Authentication state
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// The caller of a protected route
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub actor: Actor,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> &Actor {
        &self.actor
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify a raw JWT and turn it into an actor.
pub fn authenticate(token: &str, config: &JwtConfig) -> Result<AuthenticatedUser, AuthError> {
    let claims = verify_token(token, config).map_err(|e| {
        debug!(error = %e, "JWT rejected");
        AuthError::InvalidToken
    })?;
    let actor = claims.to_actor().map_err(|_| AuthError::UnknownRole)?;
    Ok(AuthenticatedUser { actor })
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match authenticate(token, &auth_state.jwt_config) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

pub fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing authentication token",
        AuthError::InvalidToken => "Invalid or expired authentication token",
        AuthError::UnknownRole => "Token carries an unknown role",
    };

    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}
