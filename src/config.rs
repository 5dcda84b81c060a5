use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

// === Content bounds ===

pub const MAX_POST_CONTENT: usize = 5000;
pub const MAX_COMMENT_CONTENT: usize = 2000;
pub const MAX_BIO: usize = 255;
pub const MAX_IMAGE_URL: usize = 255;

pub const DEFAULT_PAGE_SIZE: usize = 10;

// === Token settings ===

// Development fallback so the crate runs without configuration. Any real
// deployment must set MURMUR_TOKEN_SECRET.
const DEV_TOKEN_SECRET: &str = "MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTIzNDU2Nzg5MDE=";

pub fn token_lifetime_ms() -> i64 {
    std::env::var("MURMUR_TOKEN_LIFETIME_MS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(86_400_000)
}

/// Signing secret, base64 in the environment. Values that do not decode are
/// used as raw bytes.
pub fn token_secret() -> Vec<u8> {
    let encoded =
        std::env::var("MURMUR_TOKEN_SECRET").unwrap_or_else(|_| DEV_TOKEN_SECRET.to_string());
    BASE64
        .decode(encoded.trim())
        .unwrap_or_else(|_| encoded.into_bytes())
}
