use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use shared_models::auth::{AuthUser, TokenClaims};

/// Identity tokens expire one hour after issue.
pub const TOKEN_TTL_SECONDS: u64 = 60 * 60;

pub fn issue_token(email: &str, jwt_secret: &str) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now().timestamp().max(0) as u64;
    let claims = TokenClaims {
        email: email.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECONDS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign token: {}", e))
}

/// Verifies signature and expiry and returns the full claim set.
pub fn decode_claims(token: &str, jwt_secret: &str) -> Result<TokenClaims, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        debug!("Token validation failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token expired".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
            _ => "Invalid token".to_string(),
        }
    })?;

    Ok(data.claims)
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<AuthUser, String> {
    let claims = decode_claims(token, jwt_secret)?;
    debug!("Token validated successfully for: {}", claims.email);
    Ok(AuthUser::from(claims))
}
