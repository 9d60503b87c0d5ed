/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{get_bearer_token, issue_access_token, verify_password, RefreshTokenStore};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::routes::users::UserResponse;
use crate::storage::Storage;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Refresh response carrying a new access token
#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Security Notes
/// - Unknown email and wrong password produce the same 401
/// - The refresh token is returned only after it has been persisted
pub async fn login(
    form: web::Json<LoginRequest>,
    storage: web::Data<Storage>,
    refresh_tokens: web::Data<RefreshTokenStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = form.into_inner();

    let user = match storage.users.find_by_email(email.trim()).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let password_hash = user.hashed_password.clone();
    let password_valid = web::block(move || verify_password(&password, &password_hash)).await??;
    if !password_valid {
        tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = issue_access_token(&user.id, &jwt_config.secret, jwt_config.access_token_ttl())?;
    let refresh_token = refresh_tokens.issue(user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in successfully");

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(&user),
        token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// Expects `Authorization: Bearer <refresh_token>`. The refresh token stays
/// valid; only a new access token is issued.
///
/// # Errors
/// - 401: missing header, or refresh token unknown, expired or revoked
pub async fn refresh(
    req: HttpRequest,
    refresh_tokens: web::Data<RefreshTokenStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = get_bearer_token(req.headers())?;
    let user_id = refresh_tokens.validate(&refresh_token).await?;

    let token = issue_access_token(&user_id, &jwt_config.secret, jwt_config.access_token_ttl())?;

    tracing::info!(user_id = %user_id, "Access token refreshed");

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Expects `Authorization: Bearer <refresh_token>`. Revoking twice is fine.
///
/// # Errors
/// - 401: missing header or unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    refresh_tokens: web::Data<RefreshTokenStore>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = get_bearer_token(req.headers())?;
    refresh_tokens.revoke(&refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}
