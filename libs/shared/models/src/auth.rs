use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by an identity token. Only the email is meaningful to the
/// handlers; `iat`/`exp` are seconds since the epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

/// The caller attached to a request once the Authenticated gate passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub email: String,
}

impl From<TokenClaims> for AuthUser {
    fn from(claims: TokenClaims) -> Self {
        Self { email: claims.email }
    }
}
