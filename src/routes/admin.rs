/// Admin Routes

use actix_web::{web, HttpResponse};

use crate::auth::RefreshTokenStore;
use crate::configuration::{ApplicationSettings, Platform};
use crate::error::AppError;
use crate::middleware::FileserverHits;
use crate::storage::Storage;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<FileserverHits>) -> HttpResponse {
    let body = format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        hits.load()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// POST /admin/reset
///
/// Development only: zero the hit counter and delete every refresh token,
/// user and chirp.
///
/// # Errors
/// - 403: not running on the `dev` platform
pub async fn reset(
    application: web::Data<ApplicationSettings>,
    hits: web::Data<FileserverHits>,
    refresh_tokens: web::Data<RefreshTokenStore>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    if application.platform != Platform::Dev {
        return Err(AppError::Forbidden(
            "Reset is only allowed in the dev environment".to_string(),
        ));
    }

    hits.reset();
    refresh_tokens.purge().await?;
    let deleted_users = storage.users.delete_all().await?;

    tracing::info!(deleted_users = deleted_users, "Application state reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Reset"))
}
