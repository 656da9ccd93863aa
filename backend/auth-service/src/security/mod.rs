/// Security module for authentication
/// Provides password hashing; bearer tokens come from crypto-core

pub use crypto_core::jwt;
pub use crypto_core::{TokenError, TokenPair, TokenService};

pub mod password;

pub use password::{hash_password, verify_password};
