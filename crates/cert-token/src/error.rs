//! Errors surfaced by the token protocol.

use thiserror::Error;

use crate::cipher::CipherError;

/// Which cipher pass an operation failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// The wrapping pass over `ciphertext/tag/extension`.
    Outer,
    /// The pass over the delimited field record.
    Inner,
    /// A CI/DI subfield encrypted on its own.
    Nested,
    /// An unframed ciphertext decrypted once.
    Single,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Layer::Outer => "outer",
            Layer::Inner => "inner",
            Layer::Nested => "nested",
            Layer::Single => "single-pass",
        })
    }
}

/// Failure of an encode or decode call.
///
/// No variant ever carries partially decoded field data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// A request field is missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The cipher primitive rejected the input.
    #[error("{layer} cipher failure: {source}")]
    CipherFailure {
        layer: Layer,
        #[source]
        source: CipherError,
    },

    /// The authentication tag did not match the ciphertext.
    #[error("integrity check failed")]
    IntegrityCheckFailed,

    /// The decrypted record has the wrong number of fields.
    #[error("malformed record: expected {expected} fields, found {found}")]
    MalformedRecord { expected: usize, found: usize },
}

impl TokenError {
    pub(crate) fn cipher(layer: Layer) -> impl FnOnce(CipherError) -> Self {
        move |source| TokenError::CipherFailure { layer, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_layer_and_cause() {
        let e = TokenError::CipherFailure {
            layer: Layer::Outer,
            source: CipherError::AeadFailure,
        };
        assert_eq!(e.to_string(), "outer cipher failure: aead operation failed");
    }

    #[test]
    fn display_includes_counts() {
        let e = TokenError::MalformedRecord {
            expected: 18,
            found: 13,
        };
        assert!(e.to_string().contains("expected 18 fields, found 13"));
    }
}
