use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A payload together with the timestamps the signer stamps onto it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signed<P> {
    #[serde(flatten)]
    pub payload: P,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token encode failed: {0}")]
    Encode(String),
}

/// Signed-claim token primitive. Implementations must not keep any state
/// between calls; the key is supplied per call.
pub trait TokenSigner: Send + Sync {
    fn sign<P: Serialize>(
        &self,
        payload: &P,
        key: &[u8],
        ttl: Duration,
    ) -> Result<String, SignError>;

    fn verify<P: DeserializeOwned>(
        &self,
        token: &str,
        key: &[u8],
    ) -> Result<Signed<P>, SignError>;

    /// Decode the payload of an unexpired token without checking its signature.
    fn peek<P: DeserializeOwned>(&self, token: &str) -> Result<Signed<P>, SignError>;
}

/// HS256 JWT backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtSigner;

impl JwtSigner {
    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl TokenSigner for JwtSigner {
    fn sign<P: Serialize>(
        &self,
        payload: &P,
        key: &[u8],
        ttl: Duration,
    ) -> Result<String, SignError> {
        let now = Utc::now();
        let claims = Signed {
            payload,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key),
        )
        .map_err(|e| SignError::Encode(e.to_string()))
    }

    fn verify<P: DeserializeOwned>(
        &self,
        token: &str,
        key: &[u8],
    ) -> Result<Signed<P>, SignError> {
        decode::<Signed<P>>(token, &DecodingKey::from_secret(key), &Self::validation())
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    fn peek<P: DeserializeOwned>(&self, token: &str) -> Result<Signed<P>, SignError> {
        let mut validation = Self::validation();
        validation.insecure_disable_signature_validation();

        decode::<Signed<P>>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> SignError {
    match err.kind() {
        ErrorKind::ExpiredSignature => SignError::Expired,
        _ => SignError::Invalid(err.to_string()),
    }
}
