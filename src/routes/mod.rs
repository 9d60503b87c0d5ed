mod admin;
mod auth;
mod chirps;
mod health_check;
mod polka;
mod users;

pub use admin::{metrics, reset};
pub use auth::{login, refresh, revoke, LoginRequest, LoginResponse, RefreshResponse};
pub use chirps::{
    create_chirp, delete_chirp, get_chirp, list_chirps, ChirpResponse, CreateChirpRequest,
    ListChirpsQuery, SortOrder,
};
pub use health_check::health_check;
pub use polka::{polka_webhook, PolkaWebhook, PolkaWebhookData, USER_UPGRADED_EVENT};
pub use users::{create_user, CreateUserRequest, UserResponse};
