//! Token verification (the authentication collaborator).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::{JwtClaims, TokenValidationError, validate_claims};

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// HMAC-SHA256 shared-secret validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            key: DecodingKey::from_secret(&secret),
        }
    }
}

impl core::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window is checked against the caller's clock in `validate_claims`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<JwtClaims>(token, &self.key, &validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn mint(secret: &str, alg: Algorithm, claims: &JwtClaims) -> String {
        encode(&Header::new(alg), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: "0191f3a0-0000-7000-8000-000000000001".to_string(),
            role: Some("admin".to_string()),
            issued_at: now,
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn accepts_token_signed_with_same_secret() {
        let now = Utc::now();
        let token = mint("s3cret", Algorithm::HS256, &claims(now));
        let validator = Hs256JwtValidator::new(b"s3cret".to_vec());

        let decoded = validator.validate(&token, now + Duration::seconds(1)).unwrap();
        assert_eq!(decoded.role.as_deref(), Some("admin"));
    }

    #[test]
    fn rejects_wrong_secret_and_algorithm() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(b"s3cret".to_vec());

        let forged = mint("other", Algorithm::HS256, &claims(now));
        assert!(matches!(
            validator.validate(&forged, now),
            Err(TokenValidationError::Malformed(_))
        ));

        let wrong_alg = mint("s3cret", Algorithm::HS512, &claims(now));
        assert!(matches!(
            validator.validate(&wrong_alg, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let token = mint("s3cret", Algorithm::HS256, &claims(now));
        let validator = Hs256JwtValidator::new(b"s3cret".to_vec());

        let err = validator.validate(&token, now + Duration::minutes(11)).unwrap_err();
        assert_eq!(err, TokenValidationError::Expired);
    }
}
