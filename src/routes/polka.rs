/// Payment provider webhooks
///
/// Polka authenticates with `Authorization: ApiKey <key>` rather than a user token.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::get_api_key;
use crate::configuration::PolkaSettings;
use crate::error::{AppError, AuthError};
use crate::storage::Storage;

pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    pub data: PolkaWebhookData,
}

/// Constant-time comparison so the key cannot be guessed byte by byte
fn keys_match(given: &str, expected: &str) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// POST /api/polka/webhooks
///
/// Events other than `user.upgraded` are acknowledged and ignored.
///
/// # Errors
/// - 401: missing or wrong API key
/// - 404: upgraded user does not exist
pub async fn polka_webhook(
    req: HttpRequest,
    payload: web::Json<PolkaWebhook>,
    polka: web::Data<PolkaSettings>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let api_key = get_api_key(req.headers())?;
    if !keys_match(&api_key, &polka.api_key) {
        tracing::warn!("Webhook called with an unknown API key");
        return Err(AuthError::Unauthorized.into());
    }

    if payload.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = payload.data.user_id;
    if !storage.users.upgrade_to_chirpy_red(user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("f271c81ff7084ee5b99a5091b42d486e", "f271c81ff7084ee5b99a5091b42d486e"));
        assert!(!keys_match("f271c81ff7084ee5b99a5091b42d486f", "f271c81ff7084ee5b99a5091b42d486e"));
        assert!(!keys_match("short", "f271c81ff7084ee5b99a5091b42d486e"));
    }
}
