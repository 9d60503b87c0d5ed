//! Persistence for users, chirps and refresh tokens
//!
//! - Postgres: durable storage used by the server binary
//! - Memory: process-local storage used by the test suites
//!
//! Handlers and the auth core only see the repository traits; concurrency
//! control (unique tokens, atomic revoke) belongs to the implementations.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::StorageError;

/// Registered user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

/// A short post
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

/// Persisted state of one refresh token
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; a taken email is `UniqueConstraintViolation`
    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, StorageError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Returns `false` if no such user exists
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Delete every user together with their chirps and refresh tokens
    async fn delete_all(&self) -> Result<u64, StorageError>;
}

#[async_trait]
pub trait ChirpRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, StorageError>;

    /// All chirps, or one author's, oldest first
    async fn list(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, StorageError>;

    async fn find(&self, id: Uuid) -> Result<Option<Chirp>, StorageError>;

    /// Delete a chirp owned by `user_id`; returns `false` if nothing matched
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StorageError>;
}

/// Storage contract of the refresh token store, keyed on the token value
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert a new record; an existing token value is `UniqueConstraintViolation`
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StorageError>;

    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StorageError>;

    /// Set `revoked_at` unless it is already set.
    /// Returns `false` if no record exists for `token`.
    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StorageError>;

    /// Physically remove every record
    async fn delete_all(&self) -> Result<u64, StorageError>;
}

/// Repository handles shared by the HTTP layer
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub chirps: Arc<dyn ChirpRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl Storage {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStorage::new(pool));
        Self {
            users: store.clone(),
            chirps: store.clone(),
            refresh_tokens: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStorage::default());
        Self {
            users: store.clone(),
            chirps: store.clone(),
            refresh_tokens: store,
        }
    }
}
