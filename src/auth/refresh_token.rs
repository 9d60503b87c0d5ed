/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from a cryptographically secure generator, hex-encoded
/// - Opaque to the client; all state lives in the repository record
/// - Reusable until revoked or expired (no rotation on refresh)
///
/// Lifecycle: issued -> revoked (terminal), or issued -> expired (terminal).

use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{RefreshTokenError, StorageError};
use crate::storage::{RefreshTokenRecord, RefreshTokenRepository};

/// Random bytes per token; the wire form is twice as many hex characters
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token value (64 lowercase hex characters)
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issues, validates and revokes refresh tokens against a repository
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    /// Issue and persist a new token for `user_id`
    ///
    /// The token is only handed out once the record is stored.
    ///
    /// # Errors
    /// Returns the storage error if the record could not be written
    pub async fn issue(&self, user_id: Uuid) -> Result<String, StorageError> {
        let token = generate_refresh_token();
        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: token.clone(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };

        self.repository.insert(&record).await?;

        tracing::info!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");
        Ok(token)
    }

    /// Validate a refresh token
    ///
    /// Checks:
    /// 1. Token exists
    /// 2. Token has not been revoked
    /// 3. Token has not expired
    ///
    /// # Returns
    /// User ID associated with the token if valid
    pub async fn validate(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        let record = match self.repository.find(token).await? {
            Some(record) => record,
            None => {
                tracing::warn!("Refresh token not found");
                return Err(RefreshTokenError::NotFound);
            }
        };

        if record.revoked_at.is_some() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(RefreshTokenError::Revoked);
        }

        if Utc::now() >= record.expires_at {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(RefreshTokenError::Expired);
        }

        Ok(record.user_id)
    }

    /// Revoke a token
    ///
    /// Revoking an already revoked token succeeds and leaves the original
    /// revocation time in place.
    ///
    /// # Errors
    /// `NotFound` if the token was never issued
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        if !self.repository.mark_revoked(token, Utc::now()).await? {
            tracing::warn!("Attempt to revoke unknown refresh token");
            return Err(RefreshTokenError::NotFound);
        }

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Remove every refresh token; used by the administrative reset
    pub async fn purge(&self) -> Result<u64, StorageError> {
        let deleted = self.repository.delete_all().await?;
        tracing::info!(deleted = deleted, "All refresh tokens deleted");
        Ok(deleted)
    }
}
