/// Authentication gate for protected operations
///
/// Every handler that touches protected resources calls [`authenticate`],
/// usually through the [`AuthenticatedUser`] extractor.

use actix_web::http::header::HeaderMap;
use uuid::Uuid;

use crate::auth::bearer::get_bearer_token;
use crate::auth::jwt::{has_compact_shape, verify_access_token};
use crate::error::AuthError;

/// Identity of the caller, established from a verified access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Authenticate a request from its headers
///
/// Extracts the bearer token, checks its shape and verifies it. Whatever stage
/// fails, the caller only ever sees `AuthError::Unauthenticated`.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Uuid, AuthError> {
    let token = get_bearer_token(headers).map_err(|e| {
        tracing::debug!(reason = %e, "Authentication failed at credential extraction");
        AuthError::Unauthenticated
    })?;

    if !has_compact_shape(&token) {
        tracing::debug!("Authentication failed: bearer value is not a compact token");
        return Err(AuthError::Unauthenticated);
    }

    verify_access_token(&token, secret).map_err(|e| {
        tracing::debug!(reason = %e, "Authentication failed at token verification");
        AuthError::Unauthenticated
    })
}
