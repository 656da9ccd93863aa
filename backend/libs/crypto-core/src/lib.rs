//! Cryptographic building blocks shared by ImageShare services.
//!
//! - [`jwt`]: bearer token issuing and validation
//! - [`secret`]: signing secret strength checks

pub mod jwt;
pub mod secret;

pub use jwt::{Claims, TokenError, TokenKind, TokenPair, TokenService};
pub use secret::{validate_secret_strength, SecretStrength};
