/// Authentication module
///
/// Password hashing, access token issuance/verification, refresh token
/// management, Authorization header parsing and the request gate.

mod bearer;
mod claims;
mod gate;
mod jwt;
mod password;
mod refresh_token;

pub use bearer::{extract_credential, get_api_key, get_bearer_token, AuthScheme};
pub use claims::{Claims, ISSUER};
pub use gate::{authenticate, AuthenticatedUser};
pub use jwt::{has_compact_shape, issue_access_token, verify_access_token};
pub use password::{hash_password, verify_password, PASSWORD_HASH_COST};
pub use refresh_token::{generate_refresh_token, RefreshTokenStore, REFRESH_TOKEN_BYTES};
