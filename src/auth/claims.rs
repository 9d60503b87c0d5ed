/// JWT Claims structure
///
/// Payload of an access token: the registered claims of RFC 7519 that the
/// service relies on, and nothing else.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into, and required on, every access token
pub const ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `subject` that expire `ttl` from now
    pub fn new(subject: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            iss: ISSUER.to_string(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Parse the subject back into a user ID
    pub fn subject(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// A token is still valid during the second named by `exp`
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}
