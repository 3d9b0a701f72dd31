//! The cipher capability consumed by the token protocol, and its AES-256-GCM-SIV
//! implementation.
//!
//! The protocol only ever sees [`CertCipher`]: `encrypt`, `decrypt` and `tag`
//! over strings. [`SivCipher`] is the concrete capability built once per key
//! context from configuration.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant.
//! The token protocol requires deterministic output, so a single configured
//! nonce is used for every call. Identical plaintext + key always produces the
//! same ciphertext.
//!
//! Plain AES-256-GCM must not be used here: a repeated GCM nonce leaks the
//! authentication key.
//!
//! # Ciphertext format
//!
//! ```text
//! v1.<base64url-no-pad(ciphertext+aead-tag)>
//! ```
//!
//! The URL-safe alphabet never contains `/` or `|`, so ciphertext can always be
//! embedded in a delimited record.

use aes_gcm_siv::{
    aead::{Aead, KeyInit},
    Aes256GcmSiv, Nonce,
};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Minimum byte length accepted for the HMAC tag key.
pub const MIN_TAG_KEY_LEN: usize = 16;

/// Prefix that appears at the start of every ciphertext string.
pub const VERSION_PREFIX: &str = "v1.";

type HmacSha256 = Hmac<Sha256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// The cipher key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid cipher key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The nonce is the wrong length (must be [`NONCE_LEN`] bytes).
    #[error("invalid nonce length: expected {NONCE_LEN} bytes, got {0}")]
    InvalidNonceLength(usize),

    /// The tag key is shorter than [`MIN_TAG_KEY_LEN`] bytes.
    #[error("tag key too short: expected at least {MIN_TAG_KEY_LEN} bytes, got {0}")]
    InvalidTagKey(usize),

    /// Configured key material is not valid base64.
    #[error("{0} is not valid base64")]
    InvalidEncoding(&'static str),

    /// The ciphertext string does not match the `v1.<base64url>` structure.
    #[error("invalid ciphertext format")]
    InvalidFormat,

    /// AES-GCM-SIV encryption or decryption failed (wrong key or tampered data).
    #[error("aead operation failed")]
    AeadFailure,

    /// Decrypted bytes are not valid UTF-8.
    #[error("decrypted plaintext is not valid UTF-8")]
    NotUtf8,
}

/// The three primitives the token protocol is built on.
///
/// Implementations must be deterministic: the same input under the same key
/// context always yields the same output. Ciphertext must never contain `/`.
#[cfg_attr(test, mockall::automock)]
pub trait CertCipher: Send + Sync {
    /// Encrypt a plaintext string into a delimiter-free ciphertext string.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// Reverse [`CertCipher::encrypt`].
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;

    /// Keyed digest over a ciphertext string.
    fn tag(&self, ciphertext: &str) -> String;
}

/// Decoded key material, zeroed on drop and never printed.
struct SecretBytes(Box<[u8]>);

impl SecretBytes {
    fn new(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.write_str("[REDACTED]")
    }
}

/// AES-256-GCM-SIV + HMAC-SHA-256 implementation of [`CertCipher`].
///
/// `Send + Sync` and immutable after construction, so one instance can serve
/// any number of concurrent encode/decode calls.
pub struct SivCipher {
    cipher: Aes256GcmSiv,
    nonce: [u8; NONCE_LEN],
    /// Keyed HMAC state; cloned per tag computation.
    mac: HmacSha256,
}

impl std::fmt::Debug for SivCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("SivCipher")
            .field("key", &"[REDACTED]")
            .field("tag_key", &"[REDACTED]")
            .finish()
    }
}

impl SivCipher {
    /// Build a cipher from raw key, nonce and tag-key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`], [`CipherError::InvalidNonceLength`]
    /// or [`CipherError::InvalidTagKey`] when the material has the wrong size.
    pub fn new(key: &[u8], nonce: &[u8], tag_key: &[u8]) -> Result<Self, CipherError> {
        if key.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength(key.len()));
        }
        let nonce: [u8; NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| CipherError::InvalidNonceLength(nonce.len()))?;
        if tag_key.len() < MIN_TAG_KEY_LEN {
            return Err(CipherError::InvalidTagKey(tag_key.len()));
        }
        let cipher = Aes256GcmSiv::new_from_slice(key)
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
        let mac = <HmacSha256 as Mac>::new_from_slice(tag_key)
            .map_err(|_| CipherError::InvalidTagKey(tag_key.len()))?;

        Ok(Self { cipher, nonce, mac })
    }

    /// Build a cipher from standard-base64 encoded key material, as delivered
    /// through environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidEncoding`] naming the offending value, or
    /// any error of [`SivCipher::new`].
    pub fn from_base64(key: &str, nonce: &str, tag_key: &str) -> Result<Self, CipherError> {
        let key = SecretBytes::new(decode_b64(key, "cipher key")?);
        let nonce = decode_b64(nonce, "cipher iv")?;
        let tag_key = SecretBytes::new(decode_b64(tag_key, "tag key")?);
        Self::new(&key.0, &nonce, &tag_key.0)
    }
}

fn decode_b64(value: &str, what: &'static str) -> Result<Vec<u8>, CipherError> {
    STANDARD
        .decode(value.trim())
        .map_err(|_| CipherError::InvalidEncoding(what))
}

impl CertCipher for SivCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&self.nonce), plaintext.as_bytes())
            .map_err(|_| CipherError::AeadFailure)?;
        Ok(format!("{VERSION_PREFIX}{}", URL_SAFE_NO_PAD.encode(ciphertext)))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let body = ciphertext
            .strip_prefix(VERSION_PREFIX)
            .ok_or(CipherError::InvalidFormat)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| CipherError::InvalidFormat)?;
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&self.nonce), bytes.as_ref())
            .map_err(|_| CipherError::AeadFailure)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8)
    }

    fn tag(&self, ciphertext: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(ciphertext.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_cipher() -> SivCipher {
        SivCipher::new(&[0x42u8; KEY_LEN], &[0x07u8; NONCE_LEN], &[0x19u8; 32]).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let cipher = test_cipher();
        let encrypted = cipher.encrypt("TEST1234567890/20251224120000").unwrap();
        assert!(encrypted.starts_with(VERSION_PREFIX));
        assert_eq!(
            cipher.decrypt(&encrypted).unwrap(),
            "TEST1234567890/20251224120000"
        );
    }

    #[test]
    fn encryption_is_deterministic() {
        let cipher = test_cipher();
        assert_eq!(cipher.encrypt("abc").unwrap(), cipher.encrypt("abc").unwrap());
        assert_ne!(cipher.encrypt("abc").unwrap(), cipher.encrypt("abd").unwrap());
    }

    #[test]
    fn ciphertext_never_contains_delimiters() {
        let cipher = test_cipher();
        for input in ["", "/", "a/b/c", "||||", "홍길동/010-1234-5678"] {
            let ct = cipher.encrypt(input).unwrap();
            assert!(!ct.contains('/') && !ct.contains('|'), "delimiter in {ct}");
        }
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let other = SivCipher::new(&[0x43u8; KEY_LEN], &[0x07u8; NONCE_LEN], &[0x19u8; 32]).unwrap();
        let encrypted = test_cipher().encrypt("secret").unwrap();
        assert_eq!(other.decrypt(&encrypted), Err(CipherError::AeadFailure));
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let cipher = test_cipher();
        let encrypted = cipher.encrypt("tamper me").unwrap();
        let mut chars: Vec<char> = encrypted.chars().collect();
        let idx = VERSION_PREFIX.len();
        chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert!(cipher.decrypt(&tampered).is_err());
    }

    #[test]
    fn decrypt_rejects_missing_prefix() {
        assert_eq!(
            test_cipher().decrypt("plain-text-ci"),
            Err(CipherError::InvalidFormat)
        );
    }

    #[test]
    fn decrypt_rejects_bad_base64() {
        assert_eq!(test_cipher().decrypt("v1.!!!"), Err(CipherError::InvalidFormat));
    }

    #[test]
    fn tag_is_deterministic_hex() {
        let cipher = test_cipher();
        let tag = cipher.tag("v1.abc");
        assert_eq!(tag.len(), 64);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(tag, cipher.tag("v1.abc"));
        assert_ne!(tag, cipher.tag("v1.abd"));
    }

    #[test]
    fn invalid_key_material_rejected() {
        assert_eq!(
            SivCipher::new(&[0u8; 16], &[0u8; NONCE_LEN], &[0u8; 32]).unwrap_err(),
            CipherError::InvalidKeyLength(16)
        );
        assert_eq!(
            SivCipher::new(&[0u8; KEY_LEN], &[0u8; 8], &[0u8; 32]).unwrap_err(),
            CipherError::InvalidNonceLength(8)
        );
        assert_eq!(
            SivCipher::new(&[0u8; KEY_LEN], &[0u8; NONCE_LEN], &[0u8; 4]).unwrap_err(),
            CipherError::InvalidTagKey(4)
        );
    }

    #[test]
    fn from_base64_decodes_material() {
        let key = STANDARD.encode([0x42u8; KEY_LEN]);
        let iv = STANDARD.encode([0x07u8; NONCE_LEN]);
        let tag_key = STANDARD.encode([0x19u8; 32]);
        let cipher = SivCipher::from_base64(&key, &iv, &tag_key).unwrap();
        assert_eq!(
            cipher.encrypt("x").unwrap(),
            test_cipher().encrypt("x").unwrap()
        );
        assert_eq!(
            SivCipher::from_base64("%%%", &iv, &tag_key).unwrap_err(),
            CipherError::InvalidEncoding("cipher key")
        );
    }

    #[test]
    fn key_material_redacted_in_debug() {
        let dbg = format!("{:?}", test_cipher());
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("66, 66"));
        let secret = SecretBytes::new(vec![0x42; 4]);
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
    }
}
