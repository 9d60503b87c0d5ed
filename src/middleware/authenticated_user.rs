/// Request extractor for protected handlers
///
/// Declaring an `AuthenticatedUser` argument runs the authentication gate
/// before the handler body. Put it first so that an unauthenticated request
/// is rejected before its payload is parsed.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::{authenticate, AuthenticatedUser};
use crate::configuration::JwtSettings;
use crate::error::AppError;

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let jwt_config = match req.app_data::<web::Data<JwtSettings>>() {
            Some(config) => config,
            None => {
                return ready(Err(AppError::Internal(
                    "JWT settings are not registered".to_string(),
                )))
            }
        };

        let result = authenticate(req.headers(), &jwt_config.secret)
            .map(|user_id| {
                tracing::debug!(user_id = %user_id, "Request authenticated");
                AuthenticatedUser { user_id }
            })
            .map_err(AppError::from);

        ready(result)
    }
}
