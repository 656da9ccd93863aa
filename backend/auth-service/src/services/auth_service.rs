/// Sign-up, sign-in and token refresh
use crypto_core::jwt::BEARER_TOKEN_TYPE;
use crypto_core::{TokenPair, TokenService};
use std::sync::Arc;
use validator::Validate;

use super::IdentityResolver;
use crate::db::UserRepository;
use crate::error::{AuthError, IdentityField, Result};
use crate::models::user::SignupRequest;
use crate::models::{NewUser, Role, User, UserChanges};
use crate::security::password::{hash_password, verify_against_decoy, verify_password};

/// Role for a newly created user given how many users already exist.
///
/// The very first account bootstraps the system as admin.
pub fn bootstrap_role(existing_users: i64) -> Role {
    if existing_users == 0 {
        Role::Admin
    } else {
        Role::User
    }
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    resolver: IdentityResolver,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        resolver: IdentityResolver,
    ) -> Self {
        Self {
            users,
            tokens,
            resolver,
        }
    }

    /// Create an account.
    ///
    /// The user count is read before the insert without isolation, so two
    /// concurrent first sign-ups can both become admin.
    pub async fn signup(&self, request: SignupRequest) -> Result<User> {
        request.validate()?;

        if self.users.get_by_username(&request.username).await?.is_some() {
            return Err(AuthError::DuplicateIdentity(IdentityField::Username));
        }
        if self.users.get_by_email(&request.email).await?.is_some() {
            return Err(AuthError::DuplicateIdentity(IdentityField::Email));
        }

        let role = bootstrap_role(self.users.count_users().await?);
        let password_hash = hash_password(&request.password)?;

        let user = self
            .users
            .create(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                role,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User signed up: {}", user.username);
        Ok(user)
    }

    /// Check credentials and issue an access/refresh pair.
    ///
    /// Unknown user, wrong password and banned account all fail with the same
    /// `InvalidCredentials`. The new refresh token replaces the stored one.
    pub async fn signin(&self, username: &str, password: &str) -> Result<TokenPair> {
        let Some(user) = self.users.get_by_username(username).await? else {
            verify_against_decoy(password);
            tracing::info!("Sign-in failed: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password) {
            tracing::info!(user_id = user.id, "Sign-in failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if user.ban {
            tracing::warn!(user_id = user.id, "Sign-in refused for banned account");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.issue_token_pair(&user.username)?;
        self.users
            .update(
                &user,
                UserChanges {
                    refresh_token: Some(Some(pair.refresh_token.clone())),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = user.id, "User signed in");
        Ok(pair)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Every authentication failure collapses to `InvalidRefreshToken`; storage
    /// failures propagate unchanged. The refresh token is handed back as is.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let user = self
            .resolver
            .resolve_by_refresh(refresh_token)
            .await
            .map_err(|e| match e {
                AuthError::Database(_) | AuthError::Internal(_) => e,
                other => {
                    tracing::debug!("Refresh rejected: {}", other);
                    AuthError::InvalidRefreshToken
                }
            })?;

        let access_token = self.tokens.issue_access_token(&user.username)?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
            token_type: BEARER_TOKEN_TYPE.to_string(),
        })
    }
}
