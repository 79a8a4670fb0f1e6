use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::util::now_ts;

/// Access tokens are short-lived; refresh tokens last a week.
pub const ACCESS_TTL_SECS: i64 = 15 * 60;
pub const REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenUse {
    #[serde(rename = "access")]
    Access,
    #[serde(rename = "refresh")]
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "use")]
    pub token_use: TokenUse,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

fn sign(secret: &str, user_id: &str, token_use: TokenUse, ttl: i64) -> Result<String, AppError> {
    let now = now_ts();
    let claims = Claims {
        sub: user_id.to_string(),
        token_use,
        iat: now,
        exp: now + ttl,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AppError::Unauthorized)
}

pub fn issue_token_pair(secret: &str, user_id: &str) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: sign(secret, user_id, TokenUse::Access, ACCESS_TTL_SECS)?,
        refresh_token: sign(secret, user_id, TokenUse::Refresh, REFRESH_TTL_SECS)?,
        expires_in: ACCESS_TTL_SECS,
    })
}

fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Validate a bearer access token and return the account id it names.
pub fn verify_access(secret: &str, token: &str) -> Result<String, AppError> {
    let claims = decode_claims(secret, token)?;
    if claims.token_use != TokenUse::Access {
        return Err(AppError::Unauthorized);
    }
    Ok(claims.sub)
}

/// Exchange a refresh token for a fresh access token.
pub fn refresh_access(secret: &str, refresh_token: &str) -> Result<TokenPair, AppError> {
    let claims = decode_claims(secret, refresh_token)?;
    if claims.token_use != TokenUse::Refresh {
        return Err(AppError::Unauthorized);
    }

    Ok(TokenPair {
        access_token: sign(secret, &claims.sub, TokenUse::Access, ACCESS_TTL_SECS)?,
        refresh_token: refresh_token.to_string(),
        expires_in: ACCESS_TTL_SECS,
    })
}
