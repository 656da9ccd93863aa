/// Image model. The asset itself lives in the external media store; this row
/// records who owns it.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::OwnedResource;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Image {
    pub id: i32,
    pub user_id: i32,
    pub url: String,
    pub identifier: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Image {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateImageRequest {
    #[validate(url)]
    pub url: String,
    #[validate(length(max = 250))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateImageRequest {
    #[validate(length(max = 250))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListImagesQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}
