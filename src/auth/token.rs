use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::Claims;
use crate::{config::AuthConfig, error::AppError};

/// Access tokens are short-lived and stateless; refresh tokens are long-lived
/// and backed by a session row. Policy constants, not inputs.
pub const ACCESS_TTL_SECS: usize = 15 * 60;
pub const REFRESH_TTL_SECS: usize = 30 * 24 * 60 * 60;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

/// Key pair per token class so the two secrets can be rotated independently.
#[derive(Clone)]
pub struct AuthKeys {
    pub access: JwtKeys,
    pub refresh: JwtKeys,
}

impl AuthKeys {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        let access = JwtKeys::from_secret(cfg.jwt_secret.as_bytes());
        let refresh = match cfg.jwt_refresh_secret.as_ref() {
            Some(secret) => JwtKeys::from_secret(secret.as_bytes()),
            None => access.clone(),
        };
        Self { access, refresh }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
}

pub fn now_unix() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

pub fn make_claims(user_id: &Uuid, email: &str, ttl_secs: usize) -> Claims {
    let iat = now_unix();
    Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat,
        exp: iat + ttl_secs,
    }
}

pub fn sign_token(keys: &JwtKeys, claims: &Claims) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc)
        .map_err(|err| AppError::internal(format!("Token encoding failed: {err}")))
}

pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // No clock tolerance: a token is invalid the second its exp passes.
    validation.leeway = 0;

    let data = decode::<Claims>(token, &keys.dec, &validation).map_err(|err| {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature
            | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    })?;
    Ok(data.claims)
}

/// Lowercase sha256 hex of the raw token. Only this digest is persisted, so
/// a session lookup by hash is effectively a lookup by token identity.
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{JwtKeys, TokenError, hash_token, make_claims, now_unix, sign_token, verify_token};
    use crate::auth::Claims;

    #[test]
    fn makes_claims_with_expected_subject_email_and_ttl() {
        let user_id = Uuid::new_v4();
        let claims = make_claims(&user_id, "alice@example.com", 60);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp.saturating_sub(claims.iat), 60);
    }

    #[test]
    fn signed_token_verifies_with_same_secret() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let claims = make_claims(&Uuid::new_v4(), "alice@example.com", 600);
        let token = sign_token(&keys, &claims).expect("token should encode");

        let verified = verify_token(&keys, &token).expect("token should verify");
        assert_eq!(verified.sub, claims.sub);
        assert_eq!(verified.email, claims.email);
        assert_eq!(verified.iat, claims.iat);
        assert_eq!(verified.exp, claims.exp);
    }

    #[test]
    fn rejects_token_signed_with_different_secret() {
        let signer = JwtKeys::from_secret(b"secret-a");
        let verifier = JwtKeys::from_secret(b"secret-b");
        let claims = make_claims(&Uuid::new_v4(), "alice@example.com", 600);
        let token = sign_token(&signer, &claims).expect("token should encode");

        let err = verify_token(&verifier, &token).expect_err("verify should fail");
        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[test]
    fn rejects_expired_token_distinctly() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let now = now_unix();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "alice@example.com".to_string(),
            iat: now - 1_000,
            exp: now - 100,
        };
        let token = sign_token(&keys, &claims).expect("token should encode");

        let err = verify_token(&keys, &token).expect_err("verify should fail");
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn rejects_token_seconds_past_expiry() {
        // Expiry is exact; no grace window after exp.
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let now = now_unix();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "alice@example.com".to_string(),
            iat: now - 1_000,
            exp: now - 5,
        };
        let token = sign_token(&keys, &claims).expect("token should encode");

        let err = verify_token(&keys, &token).expect_err("verify should fail");
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn rejects_garbage_as_malformed() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");

        let err = verify_token(&keys, "not-a-jwt").expect_err("verify should fail");
        assert_eq!(err, TokenError::Malformed);
    }

    #[test]
    fn token_hash_is_deterministic_and_raw_free() {
        let hash = hash_token("refresh-token-1");

        assert_eq!(hash, hash_token("refresh-token-1"));
        assert_ne!(hash, hash_token("refresh-token-2"));
        assert_eq!(hash.len(), 64);
        assert!(!hash.contains("refresh"));
    }
}
