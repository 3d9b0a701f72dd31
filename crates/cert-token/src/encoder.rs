//! Two-stage token encoding: encrypt the record, tag the ciphertext, then
//! encrypt `ciphertext/tag/extension` again.

use crate::cipher::CertCipher;
use crate::error::{Layer, TokenError};
use crate::record;
use crate::schema::{CertRecord, NestedField, RequestRecord, CI_INDEX, DEFAULT_EXTENSION, DI_INDEX};
use crate::token::Token;

/// Builds tokens with an injected [`CertCipher`].
pub struct TokenEncoder<'c, C: CertCipher + ?Sized> {
    cipher: &'c C,
}

impl<'c, C: CertCipher + ?Sized> TokenEncoder<'c, C> {
    pub fn new(cipher: &'c C) -> Self {
        Self { cipher }
    }

    /// Encode an initial request.
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidInput`] if the request fails validation,
    /// [`TokenError::CipherFailure`] if the cipher rejects the input.
    pub fn encode_request(&self, request: &RequestRecord) -> Result<Token, TokenError> {
        request.validate()?;
        let record = record::join(&request.to_fields());
        self.seal(&record, &request.extension)
    }

    /// Encode an already-assembled plaintext with the default extension.
    ///
    /// # Errors
    ///
    /// [`TokenError::CipherFailure`] if the cipher rejects the input.
    pub fn encode_plaintext(&self, plaintext: &str) -> Result<Token, TokenError> {
        self.seal(plaintext, DEFAULT_EXTENSION)
    }

    /// Encode a verification result, nested-encrypting CI and DI.
    ///
    /// `Decrypted` subfields are encrypted, `Empty` ones stay empty and
    /// `PassThrough` contents are written unchanged.
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidInput`] if any non-nested field (or a passed-through
    /// subfield) contains `/` or `|`, or a passed-through subfield is empty;
    /// [`TokenError::CipherFailure`] if the cipher rejects the input.
    pub fn encode_result(&self, result: &CertRecord) -> Result<Token, TokenError> {
        let ci = self.nest(&result.ci, CI_INDEX)?;
        let di = self.nest(&result.di, DI_INDEX)?;
        let fields = result.to_fields(&ci, &di);
        for (idx, field) in fields.iter().enumerate() {
            if let Some(c) = record::reserved_char(field) {
                return Err(TokenError::InvalidInput(format!(
                    "field {idx} must not contain '{c}'"
                )));
            }
        }
        self.seal(&record::join(&fields), DEFAULT_EXTENSION)
    }

    fn nest(&self, field: &NestedField, idx: usize) -> Result<String, TokenError> {
        match field {
            NestedField::Decrypted(plain) => self
                .cipher
                .encrypt(plain)
                .map_err(TokenError::cipher(Layer::Nested)),
            NestedField::Empty => Ok(String::new()),
            // An empty slot always decodes as `Empty`.
            NestedField::PassThrough(raw) if raw.is_empty() => Err(TokenError::InvalidInput(
                format!("field {idx} pass-through value must not be empty"),
            )),
            NestedField::PassThrough(raw) => Ok(raw.clone()),
        }
    }

    fn seal(&self, plaintext: &str, extension: &str) -> Result<Token, TokenError> {
        let inner = self
            .cipher
            .encrypt(plaintext)
            .map_err(TokenError::cipher(Layer::Inner))?;
        let tag = self.cipher.tag(&inner);
        let outer = self
            .cipher
            .encrypt(&record::join(&[inner.as_str(), tag.as_str(), extension]))
            .map_err(TokenError::cipher(Layer::Outer))?;
        Ok(Token::from(outer))
    }
}
