//! Hashing utilities
//!
//! Two unrelated hashes live here:
//!
//! - a salted PBKDF2-HMAC-SHA256 used to derive the public labels of
//!   redacted spans;
//! - a plain SHA-256 of an attachment URL used as its store file name.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Hex characters kept from the secure hash in a reference label
pub const REFERENCE_HASH_LEN: usize = 7;

/// Hex characters kept from the URL hash in a file name
pub const CONTENT_HASH_LEN: usize = 32;

const SALT_LEN: usize = 16;
const DERIVED_KEY_LEN: usize = 32;

/// Per-process salt for reference labels
///
/// Generated once at startup and shared by every document of the run, so a
/// span repeated in the body and a comment gets the same label. It is never
/// persisted; labels differ between runs.
#[derive(Clone)]
pub struct RedactionSalt {
    salt: [u8; SALT_LEN],
    rounds: u32,
}

impl RedactionSalt {
    /// Draws a fresh salt from the OS RNG
    pub fn generate(rounds: u32) -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self::from_bytes(salt, rounds)
    }

    /// Builds a salt from known bytes (tests, reproducible runs)
    pub fn from_bytes(salt: [u8; SALT_LEN], rounds: u32) -> Self {
        Self {
            salt,
            rounds: rounds.max(1),
        }
    }

    /// Full hex-encoded PBKDF2 output for `input`
    pub fn secure_hash(&self, input: &str) -> String {
        let mut derived = [0u8; DERIVED_KEY_LEN];
        pbkdf2_hmac::<Sha256>(input.as_bytes(), &self.salt, self.rounds, &mut derived);
        hex::encode(derived)
    }

    /// `[^pvt_xxxxxxx]` label for a private span
    pub fn reference_label(&self, raw_text: &str) -> String {
        let hash = self.secure_hash(raw_text);
        format!("[^pvt_{}]", &hash[..REFERENCE_HASH_LEN])
    }
}

impl std::fmt::Debug for RedactionSalt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedactionSalt")
            .field("salt", &"[REDACTED]")
            .field("rounds", &self.rounds)
            .finish()
    }
}

/// File-name hash of an attachment URL
///
/// Depends on the URL only, so the same URL always maps to the same path
/// even when the bytes behind it change.
///
/// # Examples
///
/// ```
/// use issue_mirror::core::hashing::url_content_hash;
///
/// let hash = url_content_hash("https://h/a.png");
/// assert_eq!(hash.len(), 32);
/// assert_eq!(hash, url_content_hash("https://h/a.png"));
/// ```
pub fn url_content_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(CONTENT_HASH_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_salt() -> RedactionSalt {
        RedactionSalt::from_bytes([7u8; SALT_LEN], 10)
    }

    #[test]
    fn test_secure_hash_is_deterministic_for_a_salt() {
        let salt = test_salt();
        assert_eq!(salt.secure_hash("secret"), salt.secure_hash("secret"));
        assert_eq!(salt.secure_hash("secret").len(), DERIVED_KEY_LEN * 2);
    }

    #[test]
    fn test_secure_hash_depends_on_salt() {
        let a = RedactionSalt::from_bytes([1u8; SALT_LEN], 10);
        let b = RedactionSalt::from_bytes([2u8; SALT_LEN], 10);
        assert_ne!(a.secure_hash("secret"), b.secure_hash("secret"));
    }

    #[test]
    fn test_secure_hash_depends_on_rounds() {
        let a = RedactionSalt::from_bytes([1u8; SALT_LEN], 10);
        let b = RedactionSalt::from_bytes([1u8; SALT_LEN], 11);
        assert_ne!(a.secure_hash("secret"), b.secure_hash("secret"));
    }

    #[test]
    fn test_reference_label_format() {
        let label = test_salt().reference_label("<private>secret</private>");
        assert!(label.starts_with("[^pvt_"));
        assert!(label.ends_with(']'));
        let inner = &label["[^pvt_".len()..label.len() - 1];
        assert_eq!(inner.len(), REFERENCE_HASH_LEN);
        assert!(inner.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_salts_differ() {
        let a = RedactionSalt::generate(1);
        let b = RedactionSalt::generate(1);
        assert_ne!(a.secure_hash("x"), b.secure_hash("x"));
    }

    #[test]
    fn test_debug_hides_salt() {
        let debug = format!("{:?}", test_salt());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("7, 7"));
    }

    #[test]
    fn test_url_content_hash() {
        let hash = url_content_hash("https://h/a.png");
        assert_eq!(hash.len(), CONTENT_HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash, url_content_hash("https://h/b.png"));
    }

    #[test]
    fn test_url_content_hash_known_value() {
        // sha256("abc")
        assert_eq!(url_content_hash("abc"), "ba7816bf8f01cfea414140de5dae2223");
    }
}
