/// Business logic services
pub mod auth_service;
pub mod identity;
pub mod users;

pub use auth_service::AuthService;
pub use identity::IdentityResolver;
pub use users::UserService;
