//! Generation and comparison of the two secrets in the reset flow.
//!
//! Both draw from `rand::rng()`, the thread-local CSPRNG seeded from the
//! operating system.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use subtle::ConstantTimeEq;

use crate::domain::types::{CODE_LEN, TOKEN_BYTES};

/// Six uniformly random decimal digits.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// 256 random bits, base64url without padding.
pub fn generate_token_secret() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time equality. Length differences return early, which only
/// reveals the length of a fixed-size secret.
pub fn secrets_match(stored: &str, candidate: &str) -> bool {
    stored.as_bytes().ct_eq(candidate.as_bytes()).into()
}
