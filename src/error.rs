/// Error Handling Module
///
/// Domain errors stay distinct inside the crate so the logs can say exactly
/// what failed. At the HTTP boundary every authentication failure is rendered
/// with the same status, code and message: a caller must not be able to tell
/// an unknown user from a wrong password, or an expired token from a forged one.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for request data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(String),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Persistence errors
#[derive(Debug)]
pub enum StorageError {
    UniqueConstraintViolation(String),
    NotFound(String),
    ConnectionPool(String),
    Query(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::UniqueConstraintViolation(msg) => write!(f, "Duplicate entry: {}", msg),
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            StorageError::Query(msg) => write!(f, "Query error: {}", msg),
        }
    }
}

impl StdError for StorageError {}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StorageError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StorageError::UniqueConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::ConnectionPool(err.to_string())
            }
            _ => StorageError::Query(err.to_string()),
        }
    }
}

/// Failures while reading a credential out of the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    MissingHeader,
    WrongScheme,
    EmptyCredential,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::MissingHeader => write!(f, "Authorization header is missing"),
            CredentialError::WrongScheme => write!(f, "Authorization scheme is not accepted"),
            CredentialError::EmptyCredential => write!(f, "Authorization credential is empty"),
        }
    }
}

impl StdError for CredentialError {}

/// Refresh token lookup failures.
///
/// `NotFound`, `Expired` and `Revoked` are kept apart for diagnostics only;
/// they all become [`AuthError::Unauthorized`] once they reach a caller.
#[derive(Debug)]
pub enum RefreshTokenError {
    NotFound,
    Expired,
    Revoked,
    Storage(StorageError),
}

impl fmt::Display for RefreshTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshTokenError::NotFound => write!(f, "Refresh token not found"),
            RefreshTokenError::Expired => write!(f, "Refresh token has expired"),
            RefreshTokenError::Revoked => write!(f, "Refresh token has been revoked"),
            RefreshTokenError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl StdError for RefreshTokenError {}

impl From<StorageError> for RefreshTokenError {
    fn from(err: StorageError) -> Self {
        RefreshTokenError::Storage(err)
    }
}

/// Authentication errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Header absent, wrong scheme or empty credential
    MissingOrMalformedCredential,
    /// Access token failed signature, expiry, issuer or subject checks
    InvalidOrExpiredToken,
    /// Refresh token or service key rejected
    Unauthorized,
    /// A protected operation was called without a usable access token
    Unauthenticated,
    /// Unknown email or wrong password
    InvalidCredentials,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingOrMalformedCredential => write!(f, "Missing or malformed credential"),
            AuthError::InvalidOrExpiredToken => write!(f, "Invalid or expired token"),
            AuthError::Unauthorized => write!(f, "Unauthorized"),
            AuthError::Unauthenticated => write!(f, "Unauthenticated"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
        }
    }
}

impl StdError for AuthError {}

/// Configuration errors found after the sources were merged
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type returned by every handler
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Storage(StorageError),
    Auth(AuthError),
    Hashing(String),
    Forbidden(String),
    NotFound(String),
    Config(ConfigError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Storage(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Hashing(msg) => write!(f, "Hashing error: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.into())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        tracing::debug!(reason = %err, "Credential extraction failed");
        AppError::Auth(AuthError::MissingOrMalformedCredential)
    }
}

impl From<RefreshTokenError> for AppError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::Storage(e) => AppError::Storage(e),
            other => {
                tracing::debug!(reason = %other, "Refresh token rejected");
                AppError::Auth(AuthError::Unauthorized)
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", err))
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error body returned to clients
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID, also written to the log line
    pub error_id: String,
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (code, message) = match self {
            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),

            AppError::Storage(e) => match e {
                StorageError::UniqueConstraintViolation(_) => {
                    ("DUPLICATE_ENTRY", "Resource already exists".to_string())
                }
                StorageError::NotFound(_) => ("NOT_FOUND", "Resource not found".to_string()),
                StorageError::ConnectionPool(_) => (
                    "SERVICE_UNAVAILABLE",
                    "Database service temporarily unavailable".to_string(),
                ),
                StorageError::Query(_) => ("DATABASE_ERROR", "Database error occurred".to_string()),
            },

            // Every authentication failure looks the same from the outside.
            AppError::Auth(AuthError::InvalidCredentials) => {
                ("UNAUTHORIZED", "Incorrect email or password".to_string())
            }
            AppError::Auth(_) => ("UNAUTHORIZED", "Unauthorized".to_string()),

            AppError::Hashing(_) => ("INTERNAL_ERROR", "Internal server error".to_string()),
            AppError::Forbidden(msg) => ("FORBIDDEN", msg.clone()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Config(_) => ("CONFIG_ERROR", "Server configuration error".to_string()),
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error".to_string()),
        };

        let status = ResponseError::status_code(self);
        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Storage(StorageError::UniqueConstraintViolation(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Storage(e) => {
                tracing::error!(request_id = request_id, error = %e, "Storage error");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Forbidden(_) | AppError::NotFound(_) => {
                tracing::info!(request_id = request_id, error = %self, "Request rejected");
            }
            AppError::Hashing(_) | AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(request_id = request_id, error = %self, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(e) => match e {
                StorageError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::ConnectionPool(_) => StatusCode::SERVICE_UNAVAILABLE,
                StorageError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Hashing(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
