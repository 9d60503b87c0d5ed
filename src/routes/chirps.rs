/// Chirp Routes

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, ValidationError};
use crate::storage::{Chirp, Storage};
use crate::validators::{censor_profanity, validate_chirp_body};

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

#[derive(Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub sort: SortOrder,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| ValidationError::InvalidFormat("chirp_id".to_string()).into())
}

/// POST /api/chirps
///
/// # Errors
/// - 401: not authenticated
/// - 400: body longer than 140 characters
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<CreateChirpRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    validate_chirp_body(&form.body)?;
    let body = censor_profanity(&form.body);

    let chirp = storage.chirps.create(user.user_id, &body).await?;

    tracing::info!(user_id = %user.user_id, chirp_id = %chirp.id, "Chirp created");

    Ok(HttpResponse::Created().json(ChirpResponse::from(chirp)))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let mut chirps = storage.chirps.list(query.author_id).await?;
    if query.sort == SortOrder::Desc {
        chirps.reverse();
    }

    let chirps: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = storage
        .chirps
        .find(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ChirpResponse::from(chirp)))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: not authenticated
/// - 403: chirp belongs to someone else
/// - 404: no such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<String>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = storage
        .chirps
        .find(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    if chirp.user_id != user.user_id {
        return Err(AppError::Forbidden("Chirp belongs to another user".to_string()));
    }

    if !storage.chirps.delete(chirp_id, user.user_id).await? {
        return Err(AppError::NotFound("Chirp not found".to_string()));
    }

    tracing::info!(user_id = %user.user_id, chirp_id = %chirp_id, "Chirp deleted");

    Ok(HttpResponse::NoContent().finish())
}
