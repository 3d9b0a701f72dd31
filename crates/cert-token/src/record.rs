//! Positional `/`-delimited record format shared by the encoder and decoder.
//!
//! Fields are joined without escaping. Anything that might contain the
//! delimiter must either be encrypted first (ciphertext never contains `/`) or
//! be emitted through [`rejoin_safe`].

use crate::error::TokenError;

/// Primary field delimiter of the wire format.
pub const DELIMITER: char = '/';

/// Delimiter used for decoded output whose values may contain `/`.
pub const SAFE_DELIMITER: char = '|';

/// Join `fields` with [`DELIMITER`].
pub fn join<S: AsRef<str>>(fields: &[S]) -> String {
    join_with(fields, DELIMITER)
}

/// Split `record` on [`DELIMITER`], keeping empty segments.
///
/// With `expected = Some(n)` the segment count must be exactly `n`; with
/// `None` whatever count results is returned.
///
/// # Errors
///
/// Returns [`TokenError::MalformedRecord`] on a count mismatch.
pub fn split(record: &str, expected: Option<usize>) -> Result<Vec<String>, TokenError> {
    let fields: Vec<String> = record.split(DELIMITER).map(str::to_owned).collect();
    match expected {
        Some(n) if fields.len() != n => Err(TokenError::MalformedRecord {
            expected: n,
            found: fields.len(),
        }),
        _ => Ok(fields),
    }
}

/// First delimiter `value` contains, if any.
///
/// Plain field values must contain neither delimiter, or the `|`-joined
/// output of [`rejoin_safe`] would no longer split back into positions.
pub fn reserved_char(value: &str) -> Option<char> {
    value
        .chars()
        .find(|&c| c == DELIMITER || c == SAFE_DELIMITER)
}

/// Join `fields` with [`SAFE_DELIMITER`].
///
/// Recovered CI/DI plaintext is emitted as decrypted and may itself contain
/// `|`; only the positions outside those two slots are unambiguous.
pub fn rejoin_safe<S: AsRef<str>>(fields: &[S]) -> String {
    join_with(fields, SAFE_DELIMITER)
}

fn join_with<S: AsRef<str>>(fields: &[S], delimiter: char) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(field.as_ref());
    }
    out
}
