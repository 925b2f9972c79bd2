//! JWT token generation and validation
//! Implements access token + refresh token pattern with a distinct secret per kind

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token kind. Each kind is signed with its own secret, so a token of one
/// kind never verifies as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Token verification failure
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token signature or algorithm mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

impl From<&ErrorKind> for TokenError {
    fn from(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => TokenError::BadSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// JWT claims, shared by both token kinds.
///
/// Every field is required; a token missing any of them fails to decode.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,

    /// Username
    pub username: String,

    /// Elevated role flag
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &Uuid, username: &str, is_admin: bool, ttl_secs: u64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::seconds(ttl_secs as i64);

        Self {
            sub: *user_id,
            username: username.to_string(),
            is_admin,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}

/// Token pair issued at login
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64, // seconds until access token expires
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl SigningKeys {
    fn new(kind: TokenKind, secret: &str, ttl_secs: u64) -> Result<Self, AppError> {
        if secret.is_empty() {
            tracing::error!(kind = kind.as_str(), "Token signing secret is not set");
            return Err(AppError::Config(format!("{} secret is not set", kind.as_str())));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        })
    }
}

/// JWT service
pub struct JwtService {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
}

impl JwtService {
    /// Create JWT service from raw secrets and lifetimes.
    ///
    /// Fails with `AppError::Config` when a secret is empty or both secrets
    /// are identical; callers treat this as fatal at startup.
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_token_exp_secs: u64,
        refresh_token_exp_secs: u64,
    ) -> Result<Self, AppError> {
        let access = SigningKeys::new(TokenKind::Access, access_secret, access_token_exp_secs)?;
        let refresh = SigningKeys::new(TokenKind::Refresh, refresh_secret, refresh_token_exp_secs)?;

        if access_secret == refresh_secret {
            return Err(AppError::Config(
                "access and refresh secrets must be different".to_string(),
            ));
        }

        // HS256 only; any other algorithm in the header is rejected
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            access,
            refresh,
            validation,
        })
    }

    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.access_secret.expose_secret(),
            config.security.refresh_secret.expose_secret(),
            config.security.access_token_exp_secs,
            config.security.refresh_token_exp_secs,
        )
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime of a token kind in seconds
    pub fn ttl_secs(&self, kind: TokenKind) -> u64 {
        self.keys(kind).ttl_secs
    }

    /// Sign arbitrary claims with the secret of the given kind
    pub fn encode_claims(&self, kind: TokenKind, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys(kind).encoding).map_err(|e| {
            tracing::error!(kind = kind.as_str(), "Failed to encode token: {:?}", e);
            AppError::internal_error("could not generate token")
        })
    }

    fn issue(
        &self,
        kind: TokenKind,
        user_id: &Uuid,
        username: &str,
        is_admin: bool,
    ) -> Result<String, AppError> {
        let claims = Claims::new(user_id, username, is_admin, self.ttl_secs(kind));
        self.encode_claims(kind, &claims)
    }

    /// Generate access token
    pub fn issue_access_token(
        &self,
        user_id: &Uuid,
        username: &str,
        is_admin: bool,
    ) -> Result<String, AppError> {
        self.issue(TokenKind::Access, user_id, username, is_admin)
    }

    /// Generate refresh token
    pub fn issue_refresh_token(
        &self,
        user_id: &Uuid,
        username: &str,
        is_admin: bool,
    ) -> Result<String, AppError> {
        self.issue(TokenKind::Refresh, user_id, username, is_admin)
    }

    /// Generate token pair
    pub fn issue_token_pair(
        &self,
        user_id: &Uuid,
        username: &str,
        is_admin: bool,
    ) -> Result<TokenPair, AppError> {
        let access_token = self.issue_access_token(user_id, username, is_admin)?;
        let refresh_token = self.issue_refresh_token(user_id, username, is_admin)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access.ttl_secs,
        })
    }

    /// Verify a token against the secret of the expected kind.
    ///
    /// The signature is checked before expiry, so `Expired` is only returned
    /// for tokens that were genuinely signed with this kind's secret.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let error = TokenError::from(e.kind());
                tracing::debug!(kind = kind.as_str(), %error, "Token validation failed: {:?}", e);
                error
            })
    }
}
