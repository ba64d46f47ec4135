//! Bearer tokens and password digests.
//!
//! Tokens are HS256 JWTs carrying the user's email (`sub`) and id
//! (`userId`). Passwords are stored as Argon2id PHC strings, which carry
//! their own salt and parameters.

use std::fmt;
use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// Prefix of the fixed tokens accepted in demo mode.
pub const DEMO_TOKEN_PREFIX: &str = "demo-token-";

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user's email.
    pub sub: String,
    /// The user's id.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and checks access tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    /// Set when demo tokens are accepted.
    demo_user_id: Option<String>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("demo_user_id", &self.demo_user_id)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a service signing with `secret`.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            demo_user_id: None,
        }
    }

    /// Also accept `demo-token-*` tokens, resolving them to `user_id`.
    #[must_use]
    pub fn with_demo_user(mut self, user_id: impl Into<String>) -> Self {
        self.demo_user_id = Some(user_id.into());
        self
    }

    /// Build from the `auth` section.
    ///
    /// Without a configured secret a random one is generated, so tokens do
    /// not survive a restart.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let service = match &config.auth.jwt_secret {
            Some(secret) => Self::new(secret.as_bytes(), config.token_ttl()),
            None => {
                warn!("auth.jwt_secret is not set, using a random secret for this process");
                let secret: [u8; 32] = rand::random();
                Self::new(&secret, config.token_ttl())
            }
        };

        if config.auth.demo_tokens {
            warn!(
                user_id = %config.auth.demo_user_id,
                "demo tokens are enabled"
            );
            service.with_demo_user(config.auth.demo_user_id.clone())
        } else {
            service
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_at(&self, user_id: &str, email: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: email.to_string(),
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check a token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] if the token is malformed, forged or expired.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }

    /// Resolve a bearer token to a user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not valid.
    pub fn resolve(&self, token: &str) -> Result<String> {
        if let Some(demo_user) = &self.demo_user_id {
            if token.starts_with(DEMO_TOKEN_PREFIX) {
                debug!("accepted demo token");
                return Ok(demo_user.clone());
            }
        }
        Ok(self.verify(token)?.user_id)
    }
}

/// Hash a password with Argon2id into a PHC string.
///
/// # Errors
///
/// Returns [`Error::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| Error::internal(format!("encoding password salt: {e}")))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::internal(format!("hashing password: {e}")))
}

/// Check a password against a stored PHC string.
///
/// A malformed stored hash never matches.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// The authenticated caller, taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl AuthUser {
    /// The caller's user id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Fail unless the caller is `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for any other user.
    pub fn ensure_is(&self, user_id: &str) -> Result<()> {
        if self.0 == user_id {
            Ok(())
        } else {
            Err(Error::forbidden("access to another user's account"))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| Error::unauthorized("missing Authorization header"))?
            .to_str()
            .map_err(|_| Error::unauthorized("malformed Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::unauthorized("expected a Bearer token"))?;

        let tokens = Arc::<TokenService>::from_ref(state);
        tokens.resolve(token.trim()).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"0123456789abcdef0123456789abcdef", Duration::hours(24))
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let token = tokens.issue("u1", "ada@example.com").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.sub, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let token = tokens
            .issue_at("u1", "ada@example.com", Utc::now() - Duration::days(2))
            .unwrap();
        assert!(matches!(tokens.verify(&token), Err(Error::Token(_))));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = TokenService::new(b"another-secret-another-secret-xx", Duration::hours(1));
        let token = other.issue("u1", "ada@example.com").unwrap();
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn test_demo_tokens() {
        let plain = service();
        assert!(plain.resolve("demo-token-123").is_err());

        let demo = service().with_demo_user("68052ca31a411b19ce4db257");
        assert_eq!(
            demo.resolve("demo-token-123").unwrap(),
            "68052ca31a411b19ce4db257"
        );

        let token = demo.issue("u7", "u7@example.com").unwrap();
        assert_eq!(demo.resolve(&token).unwrap(), "u7");
    }

    #[test]
    fn test_password_round_trip() {
        let stored = hash_password("password123").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("password123", &stored));
        assert!(!verify_password("password124", &stored));
        assert!(!verify_password("password123", "not-a-phc-string"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("password123").unwrap();
        let b = hash_password("password123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("password123", &b));
    }

    #[test]
    fn test_hash_is_not_a_fast_digest() {
        let stored = hash_password("password123").unwrap();
        let parsed = PasswordHash::new(&stored).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        let memory = parsed.params.get_decimal("m").unwrap();
        assert!(memory >= 19 * 1024, "memory cost {memory} KiB");
    }

    #[test]
    fn test_ensure_is() {
        let user = AuthUser("u1".to_string());
        assert!(user.ensure_is("u1").is_ok());
        assert!(matches!(user.ensure_is("u2"), Err(Error::Forbidden(_))));
    }

    #[test]
    fn test_debug_hides_keys() {
        let rendered = format!("{:?}", service());
        assert!(rendered.contains("TokenService"));
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
