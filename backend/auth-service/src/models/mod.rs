/// Data models for users and owned resources
pub mod image;
pub mod user;

pub use image::Image;
pub use user::{Identity, NewUser, Role, User, UserChanges, UserResponse};

/// A record that belongs to exactly one user.
pub trait OwnedResource {
    fn owner_id(&self) -> i32;
}
