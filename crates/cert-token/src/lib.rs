//! Certificate token protocol.
//!
//! A token carries an identity-verification record between a requesting party
//! and a verification authority:
//!
//! ```text
//! record  = f0/f1/.../fN                    (CI and DI pre-encrypted in results)
//! inner   = encrypt(record)
//! tag     = tag(inner)
//! token   = encrypt(inner/tag/extension)
//! ```
//!
//! Decoding reverses each step and refuses to release any field before the tag
//! has been verified. The cipher is injected through [`CertCipher`]; this crate
//! ships [`SivCipher`] as the concrete implementation.

pub mod cipher;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod issue;
pub mod record;
pub mod schema;
pub mod token;

pub use cipher::{CertCipher, CipherError, SivCipher};
pub use decoder::TokenDecoder;
pub use encoder::TokenEncoder;
pub use error::{Layer, TokenError};
pub use schema::{CertRecord, NestedField, RequestRecord};
pub use token::Token;
