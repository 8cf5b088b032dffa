//! Bearer-token authentication.
//!
//! The auth collaborator is deliberately thin: opaque tokens from the
//! environment, compared by SHA-256 digest so raw tokens never sit in the
//! config map. Every `/api/dms/*` route requires a valid token; the rebuild
//! route additionally requires the `admin` role (checked in its handler).

use std::collections::HashMap;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Role attached to an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The authenticated caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub user_id: String,
    pub role: Role,
}

/// Token registry keyed by SHA-256 digest of the bearer token.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    tokens: HashMap<String, AuthPrincipal>,
}

impl AuthConfig {
    /// Create an empty registry (rejects everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for `user_id` with `role`.
    pub fn with_token(mut self, token: &str, user_id: impl Into<String>, role: Role) -> Self {
        self.tokens.insert(
            digest(token),
            AuthPrincipal {
                user_id: user_id.into(),
                role,
            },
        );
        self
    }

    /// Build the registry from environment variables.
    ///
    /// | Variable | Format | Role |
    /// |----------|--------|------|
    /// | `DMS_API_TOKEN` | opaque token | `user` (user_id `user`) |
    /// | `DMS_ADMIN_TOKEN` | opaque token | `admin` (user_id `admin`) |
    /// | `DMS_API_TOKENS` | comma-separated `user_id:role:token` | per entry |
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(token) = std::env::var("DMS_API_TOKEN") {
            if !token.trim().is_empty() {
                config = config.with_token(token.trim(), "user", Role::User);
            }
        }
        if let Ok(token) = std::env::var("DMS_ADMIN_TOKEN") {
            if !token.trim().is_empty() {
                config = config.with_token(token.trim(), "admin", Role::Admin);
            }
        }
        if let Ok(entries) = std::env::var("DMS_API_TOKENS") {
            for entry in entries.split(',') {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                let mut parts = entry.splitn(3, ':');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(user_id), Some(role), Some(token)) if !token.is_empty() => {
                        let role = match role {
                            "admin" => Role::Admin,
                            _ => Role::User,
                        };
                        config = config.with_token(token, user_id, role);
                    }
                    _ => {
                        warn!(
                            subsystem = "api",
                            component = "auth",
                            "Ignoring malformed DMS_API_TOKENS entry (want user_id:role:token)"
                        );
                    }
                }
            }
        }

        config
    }

    /// Resolve a bearer token to its principal.
    pub fn authenticate(&self, token: &str) -> Option<AuthPrincipal> {
        self.tokens.get(&digest(token)).cloned()
    }

    /// True when no tokens are registered.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Middleware requiring a valid bearer token on every wrapped route.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let principal = state
        .auth
        .authenticate(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid bearer token".to_string()))?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_known_token() {
        let config = AuthConfig::new().with_token("secret", "dana", Role::Admin);
        let principal = config.authenticate("secret").unwrap();
        assert_eq!(principal.user_id, "dana");
        assert!(principal.role.is_admin());
    }

    #[test]
    fn test_authenticate_unknown_token() {
        let config = AuthConfig::new().with_token("secret", "dana", Role::User);
        assert!(config.authenticate("wrong").is_none());
        assert!(config.authenticate("").is_none());
    }

    #[test]
    fn test_empty_config_rejects_all() {
        let config = AuthConfig::new();
        assert!(config.is_empty());
        assert!(config.authenticate("anything").is_none());
    }

    #[test]
    fn test_digest_is_not_identity() {
        let config = AuthConfig::new().with_token("secret", "dana", Role::User);
        // The raw token must not be usable as its own digest.
        assert!(config.tokens.get("secret").is_none());
    }
}
