//! Opaque tokens: long-lived secrets handed to clients (refresh tokens,
//! password-reset tokens). Only their one-way hash is ever persisted;
//! lookup works because the hash is deterministic for a given pepper.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;

/// Generate a cryptographically random token, hex-encoded.
///
/// `byte_length` random bytes produce `2 * byte_length` hex characters
/// (the default 64 bytes used by the service yields 128 characters).
pub fn generate(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 digest of `plaintext` with the server-side pepper appended,
/// hex-encoded. The pepper is a process-wide secret, distinct from
/// per-record salts; without it a leaked table cannot be brute-forced
/// against captured tokens offline any faster than the raw 512-bit space.
pub fn hash(plaintext: &str, pepper: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    if let Some(pepper) = pepper {
        hasher.update(pepper.as_bytes());
    }
    hex::encode(hasher.finalize())
}
