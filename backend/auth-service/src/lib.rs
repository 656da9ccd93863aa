// Auth Service Library

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use error::{AuthError, Result};

// Re-export commonly used types
pub use models::{Identity, Image, Role, User};

use crypto_core::TokenService;
use db::{ImageRepository, UserRepository};
use services::{AuthService, IdentityResolver, UserService};
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub resolver: IdentityResolver,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageRepository>,
    ) -> Self {
        let resolver = IdentityResolver::new(tokens.clone(), users.clone());
        Self {
            tokens,
            users,
            images,
            resolver,
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.users.clone(), self.tokens.clone(), self.resolver.clone())
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.users.clone())
    }
}
