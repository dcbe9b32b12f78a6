//! Access-token verification.
//!
//! Tokens are minted by the identity service. The backlog checks the HS256
//! signature and `exp`, then reads the acting user from `sub`; every other
//! claim is ignored.

use std::fmt;

use backlog_core::error::CoreError;
use backlog_core::types::DbId;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::env_or;

/// Clock skew tolerated when checking `exp`.
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Shared secret and expiry tolerance for access tokens.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub leeway_secs: u64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl AuthConfig {
    /// | Env Var           | Required | Default |
    /// |-------------------|----------|---------|
    /// | `JWT_SECRET`      | **yes**  | --      |
    /// | `JWT_LEEWAY_SECS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset or empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            leeway_secs: env_or("JWT_LEEWAY_SECS", DEFAULT_LEEWAY_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: DbId,
}

/// Resolves the acting user of a request from its bearer token.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// The user `token` acts for.
    ///
    /// Backlog rows are keyed by positive user ids, so any other subject is
    /// rejected along with bad signatures and expired tokens.
    pub fn acting_user(&self, token: &str) -> Result<DbId, CoreError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|err| {
            tracing::debug!(error = %err, "Rejected access token");
            CoreError::Unauthorized("Invalid or expired token".into())
        })?;

        match data.claims.sub {
            user_id if user_id > 0 => Ok(user_id),
            _ => Err(CoreError::Unauthorized(
                "Token subject is not a backlog user".into(),
            )),
        }
    }
}
