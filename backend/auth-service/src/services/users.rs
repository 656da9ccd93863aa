/// User administration: search, profile updates, bans and role changes
use std::sync::Arc;
use validator::Validate;

use crate::db::UserRepository;
use crate::error::{AuthError, IdentityField, Result};
use crate::models::user::UpdateUserRequest;
use crate::models::{Identity, Role, User, UserChanges};

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        let users = self.users.search(query).await?;
        if users.is_empty() {
            return Err(AuthError::NotFound("Users not found".to_string()));
        }
        Ok(users)
    }

    pub async fn get(&self, id: i32) -> Result<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))
    }

    pub async fn update(&self, id: i32, request: UpdateUserRequest) -> Result<User> {
        request.validate()?;
        let user = self.get(id).await?;

        if let Some(email) = request.email.as_deref() {
            if email != user.email {
                if let Some(existing) = self.users.get_by_email(email).await? {
                    if existing.id != user.id {
                        return Err(AuthError::DuplicateIdentity(IdentityField::Email));
                    }
                }
            }
        }

        self.users
            .update(
                &user,
                UserChanges {
                    email: request.email,
                    avatar: request.avatar,
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn delete(&self, id: i32) -> Result<User> {
        let user = self.get(id).await?;
        self.users.delete(&user).await?;

        tracing::info!(user_id = user.id, "User deleted");
        Ok(user)
    }

    /// Set or clear the ban flag. Takes effect on the user's next request.
    pub async fn set_ban(&self, actor: &Identity, id: i32, ban: bool) -> Result<User> {
        if ban && actor.id == id {
            return Err(AuthError::BadRequest("You cannot ban yourself".to_string()));
        }

        let user = self.get(id).await?;
        let updated = self
            .users
            .update(
                &user,
                UserChanges {
                    ban: Some(ban),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(actor_id = actor.id, user_id = id, ban, "User ban flag changed");
        Ok(updated)
    }

    pub async fn change_role(&self, actor: &Identity, id: i32, role: Role) -> Result<User> {
        let user = self.get(id).await?;
        let updated = self
            .users
            .update(
                &user,
                UserChanges {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            actor_id = actor.id,
            user_id = id,
            from = %user.role,
            to = %role,
            "User role changed"
        );
        Ok(updated)
    }
}
