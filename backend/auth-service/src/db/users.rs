/// User database operations
use async_trait::async_trait;
use sqlx::PgPool;

use super::UserRepository;
use crate::error::{AuthError, IdentityField, Result};
use crate::models::{NewUser, User, UserChanges};

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation on users to the colliding field.
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => {
                    return AuthError::DuplicateIdentity(IdentityField::Username)
                }
                Some(EMAIL_CONSTRAINT) => return AuthError::DuplicateIdentity(IdentityField::Email),
                _ => {}
            }
        }
    }
    AuthError::from(err)
}

/// Escape `LIKE` metacharacters so the query matches literally. Pairs with
/// `ESCAPE '\'` in the statement.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn update(&self, user: &User, changes: UserChanges) -> Result<User> {
        let (set_refresh, refresh_token) = match changes.refresh_token {
            Some(token) => (true, token),
            None => (false, None),
        };

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                avatar = COALESCE($3, avatar),
                role = COALESCE($4, role),
                ban = COALESCE($5, ban),
                refresh_token = CASE WHEN $6 THEN $7 ELSE refresh_token END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(changes.email)
        .bind(changes.avatar)
        .bind(changes.role)
        .bind(changes.ban)
        .bind(set_refresh)
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        updated.ok_or_else(|| AuthError::NotFound("User not found".to_string()))
    }

    async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn search(&self, query: &str) -> Result<Vec<User>> {
        let pattern = format!("%{}%", escape_like(query));
        let users = sqlx::query_as::<_, User>(
            r"SELECT * FROM users WHERE username ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\' ORDER BY id",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn delete(&self, user: &User) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
