//! Password hashing and access tokens.
//!
//! Passwords are hashed with Argon2id using a per-user salt that is stored
//! next to the hash. Access tokens are HMAC-signed JWTs carrying the user id
//! and email.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AuthConfig, SecurityConfig};
use crate::domain::UserId;

/// Fixed salt hashed against when the account does not exist.
const DECOY_SALT: &str = "bWFycXVlZWRlY295c2FsdA";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid salt: {0}")]
    InvalidSalt(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Who a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: UserId,
    pub email: String,
}

/// Payload stored in the access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: i32,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.id)
    }
}

#[derive(Clone)]
pub struct Credentials {
    security: SecurityConfig,
    algorithm: jsonwebtoken::Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_minutes: i64,
}

impl Credentials {
    pub fn new(security: &SecurityConfig, auth: &AuthConfig) -> Result<Self, CredentialError> {
        let algorithm = match auth.jwt_algorithm.as_str() {
            "HS256" => jsonwebtoken::Algorithm::HS256,
            "HS384" => jsonwebtoken::Algorithm::HS384,
            "HS512" => jsonwebtoken::Algorithm::HS512,
            other => return Err(CredentialError::UnsupportedAlgorithm(other.to_string())),
        };

        Ok(Self {
            security: security.clone(),
            algorithm,
            encoding_key: EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
            token_ttl_minutes: i64::try_from(auth.token_ttl_minutes).unwrap_or(i64::MAX / 60),
        })
    }

    /// Random per-user salt, B64 encoded.
    #[must_use]
    pub fn generate_salt() -> String {
        SaltString::generate(&mut OsRng).as_str().to_owned()
    }

    fn hasher(&self) -> Result<Argon2<'static>, CredentialError> {
        let params = Params::new(
            self.security.argon2_memory_cost_kib,
            self.security.argon2_time_cost,
            self.security.argon2_parallelism,
            None,
        )
        .map_err(|e| CredentialError::Hashing(format!("Invalid Argon2 params: {e}")))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hashes `password` with the given salt. The same inputs always give the same PHC string.
    pub fn hash_password(&self, password: &str, salt: &str) -> Result<String, CredentialError> {
        let salt = SaltString::from_b64(salt).map_err(|e| CredentialError::InvalidSalt(e.to_string()))?;

        let hash = self
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Fails closed: any parsing problem counts as a mismatch.
    #[must_use]
    pub fn verify_password(&self, password: &str, salt: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };

        if parsed.salt.map(|s| s.as_str()) != Some(salt) {
            return false;
        }

        // Parameters are taken from the stored hash, the output comparison is constant time.
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Pays the same hashing cost as a real check for an account that does not exist.
    /// Always a mismatch.
    #[must_use]
    pub fn verify_unknown_account(&self, password: &str) -> bool {
        let _ = self.hash_password(password, DECOY_SALT);
        false
    }

    pub fn issue_token(&self, subject: &TokenSubject) -> Result<String, CredentialError> {
        let now = chrono::Utc::now().timestamp();

        let claims = TokenClaims {
            id: subject.user_id.value(),
            email: subject.email.clone(),
            iat: now,
            exp: now.saturating_add(self.token_ttl_minutes.saturating_mul(60)),
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    pub fn decode_token(&self, token: &str) -> Result<TokenClaims, CredentialError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let auth = AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            ..AuthConfig::default()
        };
        Credentials::new(&security, &auth).unwrap()
    }

    #[test]
    fn test_hash_is_deterministic_for_salt() {
        let creds = credentials();
        let salt = Credentials::generate_salt();

        let first = creds.hash_password("hunter22", &salt).unwrap();
        let second = creds.hash_password("hunter22", &salt).unwrap();
        assert_eq!(first, second);
        assert!(!first.contains("hunter22"));

        let other_salt = Credentials::generate_salt();
        assert_ne!(salt, other_salt);
        assert_ne!(first, creds.hash_password("hunter22", &other_salt).unwrap());
    }

    #[test]
    fn test_verify_only_exact_pair() {
        let creds = credentials();
        let salt = Credentials::generate_salt();
        let stored = creds.hash_password("secret1", &salt).unwrap();

        assert!(creds.verify_password("secret1", &salt, &stored));
        assert!(!creds.verify_password("secret2", &salt, &stored));
        assert!(!creds.verify_password("secret1", &Credentials::generate_salt(), &stored));
    }

    #[test]
    fn test_verify_fails_closed() {
        let creds = credentials();
        let salt = Credentials::generate_salt();

        assert!(!creds.verify_password("secret1", &salt, "not a phc string"));
        assert!(!creds.verify_password("secret1", "", ""));
        assert!(creds.hash_password("secret1", "!").is_err());
    }

    #[test]
    fn test_unknown_account_runs_full_hash() {
        let creds = credentials();

        assert!(creds.hash_password("secret1", DECOY_SALT).is_ok());
        assert!(!creds.verify_unknown_account("secret1"));
        assert!(!creds.verify_unknown_account(""));
    }

    #[test]
    fn test_token_round_trip() {
        let creds = credentials();
        let token = creds
            .issue_token(&TokenSubject {
                user_id: UserId::new(7),
                email: "keks@example.com".to_string(),
            })
            .unwrap();

        let claims = creds.decode_token(&token).unwrap();
        assert_eq!(claims.user_id(), UserId::new(7));
        assert_eq!(claims.email, "keks@example.com");
        assert_eq!(claims.exp - claims.iat, 60 * 60 * 24 * 2);
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let creds = credentials();
        let token = creds
            .issue_token(&TokenSubject {
                user_id: UserId::new(1),
                email: "a@b.io".to_string(),
            })
            .unwrap();

        let other = Credentials::new(
            &SecurityConfig::default(),
            &AuthConfig {
                jwt_secret: "ffffffffffffffffffffffffffffffff".to_string(),
                ..AuthConfig::default()
            },
        )
        .unwrap();
        assert!(other.decode_token(&token).is_err());
        assert!(creds.decode_token("garbage").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let creds = credentials();
        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            id: 1,
            email: "a@b.io".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::new(creds.algorithm), &claims, &creds.encoding_key).unwrap();
        assert!(creds.decode_token(&token).is_err());
    }

    #[test]
    fn test_unsupported_algorithm() {
        let auth = AuthConfig {
            jwt_algorithm: "RS256".to_string(),
            ..AuthConfig::default()
        };
        assert!(matches!(
            Credentials::new(&SecurityConfig::default(), &auth),
            Err(CredentialError::UnsupportedAlgorithm(_))
        ));
    }
}
