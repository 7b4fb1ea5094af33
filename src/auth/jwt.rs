//! HS256 JSON Web Tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token algorithm")]
    Algorithm,
    #[error("bad token signature")]
    Signature,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// Signing key plus token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    secret: Vec<u8>,
    expiry_secs: i64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("expiry_secs", &self.expiry_secs)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: impl Into<Vec<u8>>, expiry_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            expiry_secs,
        }
    }

    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    /// Claims for `sub` issued at `now`, expiring after the configured lifetime.
    pub fn claims_for(&self, sub: &str, username: &str, role: &str, now: i64) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + self.expiry_secs,
        }
    }

    pub fn encode(&self, claims: &Claims) -> String {
        // Claims only hold strings and integers, serialization cannot fail
        let payload = serde_json::to_vec(claims).unwrap_or_default();
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{signing_input}.{signature}")
    }

    /// Verifies signature and expiry at `now` (Unix seconds).
    pub fn decode(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(raw_header), Some(raw_payload), Some(raw_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = URL_SAFE_NO_PAD
            .decode(raw_header)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::Algorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(raw_signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac();
        mac.update(raw_header.as_bytes());
        mac.update(b".");
        mac.update(raw_payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::Signature)?;

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(raw_payload)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
