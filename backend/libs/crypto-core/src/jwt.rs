//! Bearer token issuing and validation for ImageShare services
//!
//! Tokens are HMAC-signed JWTs carrying the caller's username as the `sub`
//! claim. Access and refresh tokens share the same claim set and differ only
//! in the expiry window used at issuance.
//!
//! ## Usage
//!
//! The signing secret is handed to [`TokenService::new`] once at startup and the
//! resulting service is shared (usually behind an `Arc`) with every component
//! that issues or validates tokens:
//!
//! ```rust
//! use crypto_core::jwt::{Algorithm, TokenService};
//!
//! let tokens = TokenService::new("a-long-random-signing-secret-value", Algorithm::HS256)
//!     .expect("valid token config");
//! let access = tokens.issue_access_token("alice").expect("issue token");
//! assert_eq!(tokens.validate(&access).expect("valid token"), "alice");
//! ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub use jsonwebtoken::Algorithm;

// ============================================================================
// Constants
// ============================================================================

pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Value of `token_type` in sign-in and refresh responses.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, foreign secret or structurally corrupt token
    #[error("invalid token")]
    Invalid,

    /// Signature is valid but the embedded expiry has passed
    #[error("token expired")]
    Expired,

    /// Signature and expiry are valid but no subject claim is present
    #[error("token has no subject")]
    MissingSubject,

    #[error("unsupported signing algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("signing secret must not be empty")]
    WeakSecret,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn ttl(self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
            TokenKind::Refresh => Duration::days(REFRESH_TOKEN_TTL_DAYS),
        }
    }
}

/// JWT claims. `sub` is optional on the wire so a token without a subject
/// decodes and can be reported as [`TokenError::MissingSubject`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

// ============================================================================
// Token Service
// ============================================================================

/// Issues and validates signed, time-bounded bearer tokens.
///
/// Holds the process-wide signing keys. The service is immutable after
/// construction and safe to share between threads.
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Build a token service from a shared HMAC secret.
    ///
    /// ## Errors
    ///
    /// - [`TokenError::UnsupportedAlgorithm`] for anything other than HS256/HS384/HS512
    /// - [`TokenError::WeakSecret`] if the secret is empty
    pub fn new(secret: &str, algorithm: Algorithm) -> Result<Self, TokenError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(TokenError::UnsupportedAlgorithm(algorithm));
        }
        if secret.is_empty() {
            return Err(TokenError::WeakSecret);
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    // ------------------------------------------------------------------------
    // Issuing
    // ------------------------------------------------------------------------

    pub fn issue_access_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_access_token_at(subject, Utc::now())
    }

    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_refresh_token_at(subject, Utc::now())
    }

    pub fn issue_access_token_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Access, now)
    }

    pub fn issue_refresh_token_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Refresh, now)
    }

    /// Issue an access and a refresh token for the same subject.
    pub fn issue_token_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        Ok(TokenPair {
            access_token: self.issue_access_token_at(subject, now)?,
            refresh_token: self.issue_refresh_token_at(subject, now)?,
            token_type: BEARER_TOKEN_TYPE.to_string(),
        })
    }

    fn issue(&self, subject: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: Some(subject.to_string()),
            iat: now.timestamp(),
            exp: (now + kind.ttl()).timestamp(),
            token_type: kind,
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Validate a token against the current time and return its subject.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as of `now` and return its subject.
    ///
    /// Checks run in a fixed order: signature and structure, then expiry,
    /// then presence of the subject. The first failing check decides the error.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = self.claims_at(token, now)?;
        match claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => {
                tracing::warn!("Rejected token without subject claim");
                Err(TokenError::MissingSubject)
            }
        }
    }

    /// Decode claims after checking signature and expiry as of `now`.
    ///
    /// The subject is not checked here.
    pub fn claims_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        // Expiry is checked below against the caller's clock, not the system clock.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Token decode failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if now.timestamp() > data.claims.exp {
            tracing::debug!(exp = data.claims.exp, "Token expired");
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

// ============================================================================
// Tests
// ============================================================================
