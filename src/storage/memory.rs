use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{Chirp, ChirpRepository, RefreshTokenRecord, RefreshTokenRepository, User, UserRepository};
use crate::error::StorageError;

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

/// In-process repositories behind a single lock.
///
/// Every operation holds the lock for its whole duration, so inserts are
/// atomic and revoke/lookup never observe a half-applied change.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::ConnectionPool("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for MemoryStorage {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, StorageError> {
        let mut state = self.state()?;
        if state.users.values().any(|u| u.email == email) {
            return Err(StorageError::UniqueConstraintViolation(format!(
                "email {} already registered",
                email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let state = self.state()?;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.state()?;
        match state.users.get_mut(&id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self) -> Result<u64, StorageError> {
        let mut state = self.state()?;
        let deleted = state.users.len() as u64;
        state.users.clear();
        state.chirps.clear();
        state.refresh_tokens.clear();
        Ok(deleted)
    }
}

#[async_trait]
impl ChirpRepository for MemoryStorage {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, StorageError> {
        let mut state = self.state()?;
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        state.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, StorageError> {
        let state = self.state()?;
        let mut chirps: Vec<Chirp> = state
            .chirps
            .iter()
            .filter(|c| author_id.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect();
        chirps.sort_by_key(|c| c.created_at);
        Ok(chirps)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Chirp>, StorageError> {
        let state = self.state()?;
        Ok(state.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.state()?;
        let before = state.chirps.len();
        state.chirps.retain(|c| !(c.id == id && c.user_id == user_id));
        Ok(state.chirps.len() < before)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStorage {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StorageError> {
        let mut state = self.state()?;
        if state.refresh_tokens.contains_key(&record.token) {
            return Err(StorageError::UniqueConstraintViolation(
                "refresh token already exists".to_string(),
            ));
        }
        state
            .refresh_tokens
            .insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StorageError> {
        let state = self.state()?;
        Ok(state.refresh_tokens.get(token).cloned())
    }

    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let mut state = self.state()?;
        match state.refresh_tokens.get_mut(token) {
            Some(record) => {
                if record.revoked_at.is_none() {
                    record.revoked_at = Some(at);
                }
                record.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self) -> Result<u64, StorageError> {
        let mut state = self.state()?;
        let deleted = state.refresh_tokens.len() as u64;
        state.refresh_tokens.clear();
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(token: &str) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            token: token.to_string(),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(60),
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let storage = MemoryStorage::default();
        UserRepository::create(&storage, "a@example.com", "hash").await.unwrap();

        let result = UserRepository::create(&storage, "a@example.com", "hash").await;
        assert!(matches!(result, Err(StorageError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn duplicate_refresh_token_is_rejected() {
        let storage = MemoryStorage::default();
        storage.insert(&record("abc")).await.unwrap();

        let result = storage.insert(&record("abc")).await;
        assert!(matches!(result, Err(StorageError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn mark_revoked_keeps_first_timestamp() {
        let storage = MemoryStorage::default();
        storage.insert(&record("abc")).await.unwrap();

        let first = Utc::now();
        assert!(storage.mark_revoked("abc", first).await.unwrap());
        assert!(storage
            .mark_revoked("abc", first + Duration::seconds(5))
            .await
            .unwrap());

        let stored = RefreshTokenRepository::find(&storage, "abc").await.unwrap().unwrap();
        assert_eq!(stored.revoked_at, Some(first));
        assert!(!storage.mark_revoked("missing", first).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_users_cascades() {
        let storage = MemoryStorage::default();
        let user = UserRepository::create(&storage, "a@example.com", "hash").await.unwrap();
        ChirpRepository::create(&storage, user.id, "hello").await.unwrap();
        storage.insert(&record("abc")).await.unwrap();

        assert_eq!(UserRepository::delete_all(&storage).await.unwrap(), 1);
        assert!(ChirpRepository::list(&storage, None).await.unwrap().is_empty());
        assert!(RefreshTokenRepository::find(&storage, "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn chirps_filter_by_author() {
        let storage = MemoryStorage::default();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        ChirpRepository::create(&storage, alice, "one").await.unwrap();
        ChirpRepository::create(&storage, bob, "two").await.unwrap();
        ChirpRepository::create(&storage, alice, "three").await.unwrap();

        let bodies: Vec<String> = ChirpRepository::list(&storage, Some(alice))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.body)
            .collect();
        assert_eq!(bodies, vec!["one", "three"]);
    }
}
