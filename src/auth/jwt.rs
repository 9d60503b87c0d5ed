/// JWT Token Generation and Validation
///
/// Access tokens are stateless: validity is reconstructed from the signature,
/// the embedded timestamps and the shared secret. There is no server-side
/// revocation, so lifetimes must stay short.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::error::{AppError, AuthError};

/// Algorithm used to sign new tokens
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Only the HMAC family is accepted on verification
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Compact JWS shape check: header, claims and signature separated by two dots
pub fn has_compact_shape(token: &str) -> bool {
    token.matches('.').count() == 2
}

/// Generate a new access token for a user
///
/// # Arguments
/// * `subject` - User's UUID
/// * `secret` - HMAC signing secret
/// * `ttl` - Lifetime measured from now; a negative value yields an already expired token
///
/// # Errors
/// Returns error if token encoding fails
pub fn issue_access_token(subject: &Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let claims = Claims::new(*subject, ttl);

    encode(
        &Header::new(SIGNING_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

fn validation() -> Validation {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    // Expiry is exact: `exp` in the past means rejected.
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation
}

/// Validate an access token and return its subject
///
/// # Errors
/// Returns `AuthError::InvalidOrExpiredToken` for every failure. The actual
/// reason (shape, signature, algorithm, expiry, issuer, subject) is only logged.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    if !has_compact_shape(token) {
        tracing::debug!("Access token rejected: not a three-part token");
        return Err(AuthError::InvalidOrExpiredToken);
    }

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        AuthError::InvalidOrExpiredToken
    })?;

    claims.subject().map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected: subject is not a user ID");
        AuthError::InvalidOrExpiredToken
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn split(token: &str) -> Vec<&str> {
        token.split('.').collect()
    }

    #[test]
    fn test_issue_and_verify_token() {
        let user_id = Uuid::new_v4();

        let token = issue_access_token(&user_id, SECRET, Duration::hours(1))
            .expect("Failed to issue token");
        let subject = verify_access_token(&token, SECRET).expect("Failed to verify token");

        assert_eq!(subject, user_id);
        assert!(has_compact_shape(&token));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_access_token(&Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to issue token");

        let result = verify_access_token(&token, "a-completely-different-secret");
        assert_eq!(result, Err(AuthError::InvalidOrExpiredToken));
    }

    #[test]
    fn test_expired_token() {
        let token = issue_access_token(&Uuid::new_v4(), SECRET, Duration::minutes(-1))
            .expect("Failed to issue token");

        let result = verify_access_token(&token, SECRET);
        assert_eq!(result, Err(AuthError::InvalidOrExpiredToken));
    }

    #[test]
    fn test_malformed_tokens() {
        for token in ["", "abc", "not.a.jwt", "a.b.c.d", "..", "onlyone.dot"] {
            let result = verify_access_token(token, SECRET);
            assert_eq!(
                result,
                Err(AuthError::InvalidOrExpiredToken),
                "token {:?} should be rejected",
                token
            );
        }
    }

    #[test]
    fn test_tampered_token() {
        let token = issue_access_token(&Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to issue token");

        let tampered = format!("{}X", token);
        assert!(verify_access_token(&tampered, SECRET).is_err());

        // Claims from another token under the original signature
        let other = issue_access_token(&Uuid::new_v4(), SECRET, Duration::hours(2))
            .expect("Failed to issue token");
        let (a, b) = (split(&token), split(&other));
        let spliced = format!("{}.{}.{}", a[0], b[1], a[2]);
        assert!(verify_access_token(&spliced, SECRET).is_err());
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        let token = issue_access_token(&Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to issue token");
        let parts = split(&token);

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", parts[1]);
        assert!(verify_access_token(&unsigned, SECRET).is_err());
    }

    #[test]
    fn test_algorithm_substitution_is_rejected() {
        let token = issue_access_token(&Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to issue token");
        let parts = split(&token);

        // {"typ":"JWT","alg":"RS256"}
        let substituted = format!("eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9.{}.{}", parts[1], parts[2]);
        assert!(verify_access_token(&substituted, SECRET).is_err());
    }

    #[test]
    fn test_other_hmac_algorithms_are_accepted() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token");

        assert_eq!(verify_access_token(&token, SECRET), Ok(user_id));
    }

    #[test]
    fn test_wrong_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token");

        assert!(verify_access_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_subject_must_be_a_user_id() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.sub = "not-a-uuid".to_string();
        let token = encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token");

        assert_eq!(
            verify_access_token(&token, SECRET),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }
}
