/// Authorization header parsing
///
/// Two credential contexts share one algorithm and differ only by the scheme
/// literal: user access and refresh tokens travel as `Bearer <token>`, the
/// payment provider's webhook key as `ApiKey <key>`.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::CredentialError;

/// Accepted `Authorization` schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    ApiKey,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::ApiKey => "ApiKey",
        }
    }
}

/// Pull the credential for `scheme` out of the request headers
///
/// The header is split on its first space; the scheme compares
/// case-insensitively and the credential is returned trimmed.
///
/// # Errors
/// - `MissingHeader` if there is no readable, non-blank `Authorization` header
/// - `WrongScheme` if the header has no scheme separator or names another scheme
/// - `EmptyCredential` if nothing but whitespace follows the scheme
pub fn extract_credential(headers: &HeaderMap, scheme: AuthScheme) -> Result<String, CredentialError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.trim().is_empty())
        .ok_or(CredentialError::MissingHeader)?;

    let (given_scheme, credential) = value
        .split_once(' ')
        .ok_or(CredentialError::WrongScheme)?;

    if !given_scheme.eq_ignore_ascii_case(scheme.as_str()) {
        return Err(CredentialError::WrongScheme);
    }

    let credential = credential.trim();
    if credential.is_empty() {
        return Err(CredentialError::EmptyCredential);
    }

    Ok(credential.to_string())
}

/// `Authorization: Bearer <token>`
pub fn get_bearer_token(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_credential(headers, AuthScheme::Bearer)
}

/// `Authorization: ApiKey <key>`
pub fn get_api_key(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_credential(headers, AuthScheme::ApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_valid_bearer_token() {
        assert_eq!(get_bearer_token(&headers_with("Bearer abc")), Ok("abc".to_string()));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(get_bearer_token(&headers_with("bearer abc")), Ok("abc".to_string()));
        assert_eq!(get_api_key(&headers_with("APIKEY k-1")), Ok("k-1".to_string()));
    }

    #[test]
    fn test_credential_is_trimmed() {
        assert_eq!(get_bearer_token(&headers_with("Bearer   abc  ")), Ok("abc".to_string()));
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(
            get_bearer_token(&headers_with("Basic abc")),
            Err(CredentialError::WrongScheme)
        );
        assert_eq!(
            get_bearer_token(&headers_with("ApiKey abc")),
            Err(CredentialError::WrongScheme)
        );
        assert_eq!(
            get_api_key(&headers_with("Bearer abc")),
            Err(CredentialError::WrongScheme)
        );
    }

    #[test]
    fn test_scheme_without_separator() {
        assert_eq!(
            get_bearer_token(&headers_with("Bearer")),
            Err(CredentialError::WrongScheme)
        );
        assert_eq!(
            get_bearer_token(&headers_with("Bearerabc")),
            Err(CredentialError::WrongScheme)
        );
    }

    #[test]
    fn test_empty_credential() {
        assert_eq!(
            get_bearer_token(&headers_with("Bearer ")),
            Err(CredentialError::EmptyCredential)
        );
        assert_eq!(
            get_api_key(&headers_with("ApiKey    ")),
            Err(CredentialError::EmptyCredential)
        );
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            get_bearer_token(&HeaderMap::new()),
            Err(CredentialError::MissingHeader)
        );
        assert_eq!(get_bearer_token(&headers_with("")), Err(CredentialError::MissingHeader));
    }
}
