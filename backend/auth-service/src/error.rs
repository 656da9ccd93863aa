/// Error types for the auth service
///
/// Authentication failures (who are you) map to 401, authorization failures
/// (you can't do that) map to 403. The internal variants stay distinct so logs
/// and tests can tell an expired token from a forged one.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use crypto_core::TokenError;
use std::fmt;
use thiserror::Error;

/// Unique user field that collided at creation or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Username,
    Email,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityField::Username => write!(f, "username"),
            IdentityField::Email => write!(f, "email"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token has no subject")]
    MissingSubject,

    #[error("Token subject does not match any user")]
    UnknownSubject,

    #[error("Account banned")]
    BannedAccount,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Current user not authorized for this action")]
    InsufficientRole,

    #[error("User with the same {0} already exists.")]
    DuplicateIdentity(IdentityField),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Message exposed to API clients.
    ///
    /// Token and subject failures share one message so a caller cannot probe
    /// which check rejected them.
    fn public_message(&self) -> String {
        match self {
            AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::MissingSubject
            | AuthError::UnknownSubject => "Could not validate credentials".to_string(),
            AuthError::BannedAccount => "account banned".to_string(),
            AuthError::Database(_) | AuthError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::MissingSubject
            | AuthError::UnknownSubject
            | AuthError::BannedAccount
            | AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::DuplicateIdentity(_) => StatusCode::CONFLICT,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::BadRequest(_) | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header(("WWW-Authenticate", "Bearer"));
        }

        builder.json(serde_json::json!({
            "error": self.public_message(),
            "status": status.as_u16(),
        }))
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::MissingSubject => AuthError::MissingSubject,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AuthError) -> serde_json::Value {
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_authentication_failures_are_401() {
        for err in [
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::MissingSubject,
            AuthError::UnknownSubject,
            AuthError::BannedAccount,
            AuthError::InvalidCredentials,
            AuthError::InvalidRefreshToken,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{err:?}");
        }
    }

    #[test]
    fn test_authorization_failure_is_403() {
        assert_eq!(AuthError::InsufficientRole.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_duplicate_identity_messages() {
        let username = AuthError::DuplicateIdentity(IdentityField::Username);
        let email = AuthError::DuplicateIdentity(IdentityField::Email);

        assert_eq!(username.status_code(), StatusCode::CONFLICT);
        assert_eq!(username.to_string(), "User with the same username already exists.");
        assert_eq!(email.to_string(), "User with the same email already exists.");
    }

    #[test]
    fn test_token_error_mapping() {
        assert!(matches!(AuthError::from(TokenError::Invalid), AuthError::InvalidToken));
        assert!(matches!(AuthError::from(TokenError::Expired), AuthError::ExpiredToken));
        assert!(matches!(
            AuthError::from(TokenError::MissingSubject),
            AuthError::MissingSubject
        ));
    }

    #[actix_web::test]
    async fn test_token_failures_share_public_message() {
        let expired = body_of(AuthError::ExpiredToken).await;
        let unknown = body_of(AuthError::UnknownSubject).await;

        assert_eq!(expired["error"], unknown["error"]);
        assert_eq!(expired["status"], 401);
    }

    #[actix_web::test]
    async fn test_banned_message_is_distinct() {
        let body = body_of(AuthError::BannedAccount).await;
        assert_eq!(body["error"], "account banned");
    }

    #[actix_web::test]
    async fn test_database_detail_is_hidden() {
        let err = AuthError::Database("relation \"users\" does not exist".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(err).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_unauthorized_sets_bearer_challenge() {
        let response = AuthError::InvalidToken.error_response();
        assert_eq!(
            response.headers().get("WWW-Authenticate").unwrap(),
            "Bearer"
        );
    }
}
