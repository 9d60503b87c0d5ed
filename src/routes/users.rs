/// User Routes

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::AppError;
use crate::storage::{Storage, User};
use crate::validators::{is_valid_email, validate_password};

/// User registration request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; the password hash never leaves the server
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email.clone(),
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email, empty or over-long password, missing fields
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let CreateUserRequest { email, password } = form.into_inner();

    let email = is_valid_email(&email)?;
    validate_password(&password)?;

    // bcrypt runs on the blocking pool
    let password_hash = web::block(move || hash_password(&password)).await??;

    let user = storage.users.create(&email, &password_hash).await?;

    tracing::info!(user_id = %user.id, "User registered successfully");

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}
