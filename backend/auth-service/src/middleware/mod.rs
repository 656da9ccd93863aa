/// HTTP middleware: bearer authentication and authorization gates
pub mod jwt_auth;
pub mod permissions;

pub use jwt_auth::{bearer_token, JwtAuthMiddleware};
pub use permissions::{OwnershipGate, PathParams, RoleGate};
