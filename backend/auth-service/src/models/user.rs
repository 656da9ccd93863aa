/// User model and request/response payloads
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::OwnedResource;

/// Closed set of roles. Stored as the Postgres enum `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Argon2 PHC digest, never the plaintext
    pub password: String,
    pub avatar: Option<String>,
    /// Most recently issued refresh token (single slot)
    pub refresh_token: Option<String>,
    pub confirmed: bool,
    pub ban: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for User {
    fn owner_id(&self) -> i32 {
        self.id
    }
}

/// Resolved caller handed to request handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub ban: bool,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            ban: user.ban,
        }
    }
}

/// Fields for inserting a user. The role is decided by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<Role>,
    pub ban: Option<bool>,
    /// `Some(None)` clears the stored refresh token
    pub refresh_token: Option<Option<String>>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(email, length(max = 150))]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

/// Form body of `POST /auth/signin`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SigninForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email, length(max = 150))]
    pub email: Option<String>,
    #[validate(url)]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BanRequest {
    pub ban: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1))]
    pub query: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Public projection of [`User`]; omits the password digest and refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub confirmed: bool,
    pub ban: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            role: user.role,
            confirmed: user.confirmed,
            ban: user.ban,
            created_at: user.created_at,
        }
    }
}
