use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config;

type HmacSha256 = Hmac<Sha256>;

/// Why a token failed verification. Callers treat both the same way; the
/// split exists for diagnostics.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Not three segments, bad base64, or a payload that does not parse.
    #[error("token is structurally malformed")]
    Malformed,
    /// Well-formed, but the signature does not match the content.
    #[error("token signature does not match")]
    SignatureMismatch,
}

/// The signed claims carried in a token's payload segment. Timestamps are
/// unix epoch milliseconds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Issues and verifies the compact signed tokens that stand in for
/// sessions.
///
/// Wire format is `base64url(header).base64url(claims).base64url(sig)`
/// without padding, signed over `header "." claims` with HMAC-SHA256 and a
/// shared secret. Tokens carry their own expiry; nothing about them is
/// persisted, so there is no revocation.
pub struct TokenCodec {
    secret: Vec<u8>,
    lifetime: Duration,
}

impl TokenCodec {
    /// A negative `lifetime_ms` issues tokens that are already expired,
    /// which the expiry tests lean on.
    pub fn new(secret: impl Into<Vec<u8>>, lifetime_ms: i64) -> Self {
        Self { secret: secret.into(), lifetime: Duration::milliseconds(lifetime_ms) }
    }

    /// Codec configured from `MURMUR_TOKEN_SECRET` and
    /// `MURMUR_TOKEN_LIFETIME_MS`.
    pub fn from_env() -> Self {
        Self::new(config::token_secret(), config::token_lifetime_ms())
    }

    /// Signs a token for `subject`, valid from `now` for the configured
    /// lifetime.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp_millis(),
            exp: (now + self.lifetime).timestamp_millis(),
        };
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).expect("claims serialize to json"));
        let signing_input = format!("{header}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));
        format!("{signing_input}.{signature}")
    }

    /// Authenticates the token and returns its claims. Expiry is not
    /// checked here.
    pub fn claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (header, payload, signature) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(TokenError::Malformed),
            };

        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| TokenError::Malformed)?;
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key length");
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| TokenError::SignatureMismatch)?;

        // Only parsed once the signature holds.
        let header = URL_SAFE_NO_PAD.decode(header).map_err(|_| TokenError::Malformed)?;
        let header: Header = serde_json::from_slice(&header).map_err(|_| TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::Malformed);
        }
        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| TokenError::Malformed)?;
        serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)
    }

    /// Extracts the subject of an authentic token without checking expiry,
    /// so the caller can still tell who an expired token belonged to.
    pub fn verify_subject(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.claims(token)?.sub)
    }

    /// Full check: authentic, subject matches exactly (case included), and
    /// `now` is strictly before the expiry. Malformed input is `false`,
    /// never a panic.
    pub fn is_valid(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        match self.claims(token) {
            Ok(claims) => {
                claims.sub == expected_subject && now.timestamp_millis() < claims.exp
            }
            Err(_) => false,
        }
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key length");
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}
