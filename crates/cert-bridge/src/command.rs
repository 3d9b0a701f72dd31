//! Bridge subcommands and their execution against a cipher.

use anyhow::{Context, Result};
use cert_token::{CertCipher, TokenDecoder, TokenEncoder};
use clap::Subcommand;
use tracing::debug;

/// Available bridge operations. Each prints its result to stdout.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Wrap an already-delimited plaintext record into a token.
    Enc {
        /// Plaintext record, fields separated by `/`.
        data: String,
    },
    /// Decode a token and print its fields joined by `|`.
    Dec {
        /// Token to decode.
        data: String,
    },
    /// Undo a single cipher pass.
    DecSimple {
        /// Ciphertext produced by one encryption.
        data: String,
    },
}

impl Command {
    /// Run the operation and return what should be printed.
    ///
    /// # Errors
    ///
    /// Returns an error when the cipher rejects the input or the token fails
    /// its integrity check.
    pub fn run<C: CertCipher + ?Sized>(&self, cipher: &C) -> Result<String> {
        match self {
            Command::Enc { data } => {
                debug!(len = data.len(), "encoding");
                let token = TokenEncoder::new(cipher)
                    .encode_plaintext(data)
                    .context("encoding failed")?;
                Ok(token.into_string())
            }
            Command::Dec { data } => TokenDecoder::new(cipher)
                .decode_piped(data)
                .context("decoding failed"),
            Command::DecSimple { data } => TokenDecoder::new(cipher)
                .decode_simple(data)
                .context("decoding failed"),
        }
    }
}
