/// Persistence collaborators
///
/// The auth core only talks to storage through these traits so the gates and
/// the identity resolver can be exercised against in-memory fakes.
pub mod images;
pub mod users;

pub use images::PgImageRepository;
pub use users::PgUserRepository;

use crate::error::Result;
use crate::models::{Identity, Image, NewUser, OwnedResource, User, UserChanges};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive match.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_by_id(&self, id: i32) -> Result<Option<User>>;

    async fn create(&self, new_user: NewUser) -> Result<User>;

    async fn update(&self, user: &User, changes: UserChanges) -> Result<User>;

    async fn count_users(&self) -> Result<i64>;

    /// Case-insensitive substring match on username or email.
    async fn search(&self, query: &str) -> Result<Vec<User>>;

    async fn delete(&self, user: &User) -> Result<()>;
}

/// Single-record lookup used by the ownership gate.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    type Resource: OwnedResource + Send;

    async fn get_single(&self, caller: &Identity, id: i32) -> Result<Option<Self::Resource>>;
}

/// Users own themselves, so user records can sit behind the ownership gate too.
pub struct UserLookup(pub Arc<dyn UserRepository>);

#[async_trait]
impl ResourceLookup for UserLookup {
    type Resource = User;

    async fn get_single(&self, _caller: &Identity, id: i32) -> Result<Option<User>> {
        self.0.get_by_id(id).await
    }
}

#[async_trait]
pub trait ImageRepository: ResourceLookup<Resource = Image> {
    /// Register an already-uploaded asset for `owner`.
    async fn create(&self, owner: &Identity, url: &str, description: Option<&str>) -> Result<Image>;

    async fn list_for_owner(&self, owner_id: i32, offset: i64, limit: i64) -> Result<Vec<Image>>;

    /// `None` when no image has this id.
    async fn update_description(&self, id: i32, description: Option<&str>) -> Result<Option<Image>>;

    /// Returns the deleted row, `None` when no image has this id.
    async fn delete(&self, id: i32) -> Result<Option<Image>>;
}
