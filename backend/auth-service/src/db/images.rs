/// Image database operations
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ImageRepository, ResourceLookup};
use crate::error::Result;
use crate::models::{Identity, Image};

#[derive(Clone)]
pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceLookup for PgImageRepository {
    type Resource = Image;

    async fn get_single(&self, _caller: &Identity, id: i32) -> Result<Option<Image>> {
        let image = sqlx::query_as::<_, Image>("SELECT * FROM images WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(image)
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn create(&self, owner: &Identity, url: &str, description: Option<&str>) -> Result<Image> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (user_id, url, identifier, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(owner.id)
        .bind(url)
        .bind(Uuid::new_v4().to_string())
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(image)
    }

    async fn list_for_owner(&self, owner_id: i32, offset: i64, limit: i64) -> Result<Vec<Image>> {
        let images = sqlx::query_as::<_, Image>(
            "SELECT * FROM images WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn update_description(&self, id: i32, description: Option<&str>) -> Result<Option<Image>> {
        let image = sqlx::query_as::<_, Image>(
            "UPDATE images SET description = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    async fn delete(&self, id: i32) -> Result<Option<Image>> {
        let image = sqlx::query_as::<_, Image>("DELETE FROM images WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(image)
    }
}
