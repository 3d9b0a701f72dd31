//! Token decoding with integrity enforcement.
//!
//! Every decode path runs the same gate:
//!
//! ```text
//! Start ─▶ OuterDecrypted ─▶ SegmentsParsed ─▶ IntegrityVerified ─▶ InnerDecrypted
//!        │                 │                 │                     │
//!        ▼                 ▼                 ▼                     ▼
//!   CipherFailure   MalformedRecord   IntegrityCheckFailed   CipherFailure
//! ```
//!
//! after which [`TokenDecoder::decode`] splits strictly into the 18-field
//! schema and [`TokenDecoder::decode_piped`] splits permissively. Both recover
//! the nested CI/DI subfields best-effort.

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::cipher::CertCipher;
use crate::error::{Layer, TokenError};
use crate::record;
use crate::schema::{CertRecord, NestedField, CI_INDEX, DI_INDEX, RESULT_FIELD_COUNT};

/// The three segments of a decrypted outer layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub ciphertext: &'a str,
    pub tag: &'a str,
    /// Everything after the second delimiter; carried, not interpreted.
    pub extension: &'a str,
}

impl<'a> Envelope<'a> {
    /// Split a decrypted outer layer at its first two delimiters.
    ///
    /// # Errors
    ///
    /// [`TokenError::MalformedRecord`] if fewer than two delimiters are present.
    pub fn parse(outer: &'a str) -> Result<Self, TokenError> {
        let mut parts = outer.splitn(3, record::DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ciphertext), Some(tag), Some(extension)) => Ok(Self {
                ciphertext,
                tag,
                extension,
            }),
            (_, tag, _) => Err(TokenError::MalformedRecord {
                expected: 3,
                found: if tag.is_some() { 2 } else { 1 },
            }),
        }
    }
}

/// Decodes tokens with an injected [`CertCipher`].
pub struct TokenDecoder<'c, C: CertCipher + ?Sized> {
    cipher: &'c C,
}

impl<'c, C: CertCipher + ?Sized> TokenDecoder<'c, C> {
    pub fn new(cipher: &'c C) -> Self {
        Self { cipher }
    }

    /// Decode a result token into the full 18-field record.
    ///
    /// # Errors
    ///
    /// [`TokenError::CipherFailure`] if either layer fails to decrypt,
    /// [`TokenError::IntegrityCheckFailed`] on a tag mismatch,
    /// [`TokenError::MalformedRecord`] if the record does not have exactly 18
    /// fields. No field data is returned on any error.
    pub fn decode(&self, token: &str) -> Result<CertRecord, TokenError> {
        let record = self.open(token)?;
        let mut fields = record::split(&record, Some(RESULT_FIELD_COUNT))?;
        let ci = self.recover(&mut fields, CI_INDEX);
        let di = self.recover(&mut fields, DI_INDEX);
        CertRecord::from_fields(fields, ci, di)
    }

    /// Decode any token into its fields joined with `|`, without assuming the
    /// 18-field schema.
    ///
    /// The integrity gate is the same as [`TokenDecoder::decode`]. CI/DI slots
    /// are decrypted when present; slots that fail stay as they were.
    ///
    /// # Errors
    ///
    /// [`TokenError::CipherFailure`], [`TokenError::IntegrityCheckFailed`] or
    /// [`TokenError::MalformedRecord`] from the shared gate.
    pub fn decode_piped(&self, token: &str) -> Result<String, TokenError> {
        let record = self.open(token)?;
        let mut fields = record::split(&record, None)?;
        for idx in [CI_INDEX, DI_INDEX] {
            if idx < fields.len() {
                self.recover(&mut fields, idx);
            }
        }
        Ok(record::rejoin_safe(&fields))
    }

    /// Single decrypt with no framing.
    ///
    /// # Errors
    ///
    /// [`TokenError::CipherFailure`] if the cipher rejects the input.
    pub fn decode_simple(&self, ciphertext: &str) -> Result<String, TokenError> {
        self.cipher
            .decrypt(ciphertext)
            .map_err(TokenError::cipher(Layer::Single))
    }

    /// Outer decrypt, segment parse, integrity gate, inner decrypt.
    fn open(&self, token: &str) -> Result<String, TokenError> {
        let outer = self
            .cipher
            .decrypt(token)
            .map_err(TokenError::cipher(Layer::Outer))?;
        let envelope = Envelope::parse(&outer)?;

        let expected = self.cipher.tag(envelope.ciphertext);
        if !bool::from(expected.as_bytes().ct_eq(envelope.tag.as_bytes())) {
            warn!("token integrity check failed");
            return Err(TokenError::IntegrityCheckFailed);
        }
        debug!(extension_len = envelope.extension.len(), "token integrity verified");

        self.cipher
            .decrypt(envelope.ciphertext)
            .map_err(TokenError::cipher(Layer::Inner))
    }

    /// Replace `fields[idx]` with its decrypted value when possible.
    ///
    /// The slot is left untouched on failure and the outcome is reported.
    fn recover(&self, fields: &mut [String], idx: usize) -> NestedField {
        let slot = &mut fields[idx];
        if slot.is_empty() {
            return NestedField::Empty;
        }
        match self.cipher.decrypt(slot.as_str()) {
            Ok(plain) => {
                *slot = plain.clone();
                NestedField::Decrypted(plain)
            }
            Err(e) => {
                warn!(field = idx, error = %e, "nested field did not decrypt; passing through");
                NestedField::PassThrough(slot.clone())
            }
        }
    }
}
