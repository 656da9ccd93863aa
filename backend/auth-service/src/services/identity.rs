/// Identity resolution: bearer token to live user record
use chrono::{DateTime, Utc};
use crypto_core::TokenService;
use std::sync::Arc;

use crate::db::UserRepository;
use crate::error::{AuthError, Result};
use crate::models::User;

/// Maps a validated token subject to a user, enforcing the ban flag on every
/// call.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserRepository>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// Resolve an access token to the user it names.
    ///
    /// ## Errors
    ///
    /// - `InvalidToken`, `ExpiredToken`, `MissingSubject` from token validation
    /// - `UnknownSubject` when no user has that username
    /// - `BannedAccount` when the user is banned
    pub async fn resolve(&self, token: &str) -> Result<User> {
        self.resolve_at(token, Utc::now()).await
    }

    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Result<User> {
        let subject = self.tokens.validate_at(token, now).map_err(|e| {
            tracing::warn!("Access token rejected: {}", e);
            AuthError::from(e)
        })?;

        self.load_subject(&subject).await
    }

    /// Resolve a refresh token. The presented token is not compared with the
    /// user's stored refresh token.
    pub async fn resolve_by_refresh(&self, token: &str) -> Result<User> {
        let subject = self.tokens.validate(token).map_err(|e| {
            tracing::warn!("Refresh token rejected: {}", e);
            AuthError::from(e)
        })?;

        self.load_subject(&subject).await
    }

    async fn load_subject(&self, subject: &str) -> Result<User> {
        let user = self.users.get_by_username(subject).await?.ok_or_else(|| {
            tracing::warn!("Token subject does not match any user");
            AuthError::UnknownSubject
        })?;

        if user.ban {
            tracing::warn!(user_id = user.id, "Rejected request from banned account");
            return Err(AuthError::BannedAccount);
        }

        Ok(user)
    }
}
