use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};

use super::domain::UserId;
use super::errors::AuthError;

/// JWT payload. `sub` is the user id rendered as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        UserId::from_subject(&self.sub)
            .ok_or_else(|| AuthError::InvalidToken(format!("non-numeric subject {:?}", self.sub)))
    }
}

/// Signs and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: std::time::Duration) -> Result<Self, AuthError> {
        let ttl = Duration::from_std(ttl).map_err(|e| AuthError::TokenError(format!("token ttl out of range: {e}")))?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::TokenError("token expiry overflows the calendar".into()))?;
        let claims = Claims {
            sub: user_id.to_subject(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&JwtHeader::default(), &claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}
