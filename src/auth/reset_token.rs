//! Password-reset credentials.
//!
//! A reset token is an HS256 JWT signed with `base_secret || password_hash`,
//! where `password_hash` is the account's hash at the time of issue. Changing
//! the password changes the key, so every outstanding token for that account
//! stops verifying without any server-side token state.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::signer::{JwtSigner, SignError, Signed, TokenSigner};
use crate::config::ConfigError;

/// Discriminator carried in `kind` by every password-reset claim.
pub const PASSWORD_RESET_KIND: &str = "password-reset";

pub const DEFAULT_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResetPayload {
    sub: String,
    email: String,
    kind: String,
}

/// Decoded claim handed back to the caller after a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetClaim {
    pub subject: String,
    pub email: String,
    pub kind: String,
    /// Seconds since epoch.
    pub issued_at: i64,
    /// Seconds since epoch.
    pub expires_at: i64,
}

impl ResetClaim {
    fn from_signed(signed: Signed<ResetPayload>) -> Self {
        Self {
            subject: signed.payload.sub,
            email: signed.payload.email,
            kind: signed.payload.kind,
            issued_at: signed.iat,
            expires_at: signed.exp,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResetTokenError {
    /// Bad signature, malformed token or expired token.
    #[error("reset token is invalid or expired")]
    InvalidToken,
    #[error("token kind '{found}' is not a password-reset token")]
    WrongClaimKind { found: String },
    #[error("failed to sign reset token: {0}")]
    Signing(String),
}

impl From<SignError> for ResetTokenError {
    fn from(err: SignError) -> Self {
        match err {
            SignError::Encode(reason) => ResetTokenError::Signing(reason),
            SignError::Expired => {
                tracing::debug!("Reset token rejected: expired");
                ResetTokenError::InvalidToken
            }
            SignError::Invalid(reason) => {
                tracing::debug!("Reset token rejected: {reason}");
                ResetTokenError::InvalidToken
            }
        }
    }
}

/// Issues and verifies reset tokens. Cheap to clone and safe to share across
/// request tasks; the base secret is immutable after construction.
#[derive(Clone)]
pub struct ResetTokenService<S = JwtSigner> {
    base_secret: Vec<u8>,
    ttl: Duration,
    signer: S,
}

impl ResetTokenService<JwtSigner> {
    pub fn new(base_secret: &str, ttl: Duration) -> Result<Self, ConfigError> {
        Self::with_signer(base_secret, ttl, JwtSigner)
    }
}

impl<S: TokenSigner> ResetTokenService<S> {
    pub fn with_signer(base_secret: &str, ttl: Duration, signer: S) -> Result<Self, ConfigError> {
        if base_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        Ok(Self {
            base_secret: base_secret.as_bytes().to_vec(),
            ttl,
            signer,
        })
    }

    /// Issue a token with the service's configured TTL.
    pub fn issue(
        &self,
        subject: &str,
        email: &str,
        current_password_hash: &str,
    ) -> Result<String, ResetTokenError> {
        self.issue_with_ttl(subject, email, current_password_hash, self.ttl)
    }

    /// Issue a token expiring `ttl` from now. A negative `ttl` yields a token
    /// that is already expired.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        email: &str,
        current_password_hash: &str,
        ttl: Duration,
    ) -> Result<String, ResetTokenError> {
        let payload = ResetPayload {
            sub: subject.to_string(),
            email: email.to_string(),
            kind: PASSWORD_RESET_KIND.to_string(),
        };

        let key = self.derive_key(current_password_hash);
        Ok(self.signer.sign(&payload, &key, ttl)?)
    }

    /// Verify `token` against the account's *current* password hash.
    pub fn verify(
        &self,
        token: &str,
        current_password_hash: &str,
    ) -> Result<ResetClaim, ResetTokenError> {
        let key = self.derive_key(current_password_hash);
        let signed: Signed<ResetPayload> = self.signer.verify(token, &key)?;

        if signed.payload.kind != PASSWORD_RESET_KIND {
            return Err(ResetTokenError::WrongClaimKind {
                found: signed.payload.kind,
            });
        }

        Ok(ResetClaim::from_signed(signed))
    }

    /// Read the subject without checking the signature. The result is only
    /// good as a lookup key for the hash that `verify` needs.
    pub fn peek_subject(&self, token: &str) -> Result<String, ResetTokenError> {
        let signed: Signed<ResetPayload> = self.signer.peek(token)?;
        Ok(signed.payload.sub)
    }

    fn derive_key(&self, current_password_hash: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.base_secret.len() + current_password_hash.len());
        key.extend_from_slice(&self.base_secret);
        key.extend_from_slice(current_password_hash.as_bytes());
        key
    }
}

impl<S> fmt::Debug for ResetTokenService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetTokenService")
            .field("base_secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
