//! Bearer token verification (HS256).

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{validate_claims, JwtClaims, TokenValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("malformed or unsigned token: {0}")]
    Decode(String),

    #[error("failed to sign token: {0}")]
    Encode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Identity provider seam: turns a bearer token into verified claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret validator matching the identity provider's HS256 tokens.
pub struct Hs256JwtValidator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The validity window lives in `issued_at`/`expires_at` and is checked by
        // `validate_claims`, not through the registered `exp`/`aud` claims.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    /// Sign claims with the same secret (dev tooling and tests).
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| JwtError::Decode(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::Duration;
    use realtyops_core::UserId;

    fn claims(ttl: Duration) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: UserId::new(),
            email: Some("ana@example.com".into()),
            roles: vec![Role::AGENT],
            issued_at: now - Duration::seconds(1),
            expires_at: now + ttl,
        }
    }

    #[test]
    fn issued_tokens_validate() {
        let v = Hs256JwtValidator::new("secret");
        let c = claims(Duration::minutes(5));
        let token = v.issue(&c).unwrap();
        assert_eq!(v.validate(&token, Utc::now()).unwrap(), c);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = Hs256JwtValidator::new("one").issue(&claims(Duration::minutes(5))).unwrap();
        let err = Hs256JwtValidator::new("two").validate(&token, Utc::now()).unwrap_err();
        assert!(matches!(err, JwtError::Decode(_)));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let v = Hs256JwtValidator::new("secret");
        let token = v.issue(&claims(Duration::minutes(5))).unwrap();
        let later = Utc::now() + Duration::minutes(10);
        assert_eq!(v.validate(&token, later), Err(JwtError::Claims(TokenValidationError::Expired)));
    }
}
