//! Named views over the positional wire records.
//!
//! This is the only place that knows which index holds which field.
//!
//! # Request record (13 positions)
//!
//! ```text
//! cpId/urlCode/certNum/date/certMethod///////plusInfo/extendVar
//! ```
//!
//! # Result record (18 positions)
//!
//! ```text
//! certNum/date/CI/phoneNo/phoneCorp/birth/gender/nation/name/result/
//! certMethod/ip/reserve1/reserve2/reserve3/reserve4/plusInfo/DI
//! ```
//!
//! CI and DI are themselves ciphertext, encrypted independently of the record.

use crate::error::TokenError;
use crate::record;

/// Conventional value of the reserved extension slot.
pub const DEFAULT_EXTENSION: &str = "0000000000000000";

/// Required length of the extension slot.
pub const EXTENSION_LEN: usize = 16;

/// Default verification method (mobile phone).
pub const DEFAULT_CERT_METHOD: &str = "M";

/// Number of reserved empty slots between `certMethod` and `plusInfo`.
pub const REQUEST_RESERVED_SLOTS: usize = 6;

/// Number of positions in the request record.
pub const REQUEST_FIELD_COUNT: usize = 5 + REQUEST_RESERVED_SLOTS + 2;

/// Number of positions in the result record.
pub const RESULT_FIELD_COUNT: usize = 18;

/// Index of the nested CI ciphertext in the result record.
pub const CI_INDEX: usize = 2;

/// Index of the nested DI ciphertext in the result record.
pub const DI_INDEX: usize = 17;

/// Value of the `result` field for a successful verification.
pub const RESULT_VERIFIED: &str = "Y";

/// Outcome of recovering a nested CI/DI subfield.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NestedField {
    /// The slot held ciphertext and it decrypted to this value.
    Decrypted(String),
    /// The slot was empty; nothing to decrypt.
    #[default]
    Empty,
    /// The slot held something that did not decrypt; kept verbatim.
    PassThrough(String),
}

impl NestedField {
    /// The recovered value, or the original slot content for
    /// [`NestedField::PassThrough`].
    pub fn value(&self) -> &str {
        match self {
            NestedField::Decrypted(v) | NestedField::PassThrough(v) => v,
            NestedField::Empty => "",
        }
    }

    /// `true` only when the slot held ciphertext that decrypted cleanly.
    pub fn is_decrypted(&self) -> bool {
        matches!(self, NestedField::Decrypted(_))
    }
}

impl From<&str> for NestedField {
    /// Plaintext to be nested-encrypted; empty input stays [`NestedField::Empty`].
    fn from(value: &str) -> Self {
        if value.is_empty() {
            NestedField::Empty
        } else {
            NestedField::Decrypted(value.to_owned())
        }
    }
}

/// Fields of the initial request sent to the verification authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub cp_id: String,
    pub url_code: String,
    pub cert_num: String,
    pub date: String,
    pub cert_method: String,
    pub plus_info: String,
    pub extension: String,
}

impl RequestRecord {
    /// Request with the default method, empty `plus_info` and the default
    /// extension.
    pub fn new(
        cp_id: impl Into<String>,
        url_code: impl Into<String>,
        cert_num: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            cp_id: cp_id.into(),
            url_code: url_code.into(),
            cert_num: cert_num.into(),
            date: date.into(),
            cert_method: DEFAULT_CERT_METHOD.into(),
            plus_info: String::new(),
            extension: DEFAULT_EXTENSION.into(),
        }
    }

    pub fn with_cert_method(mut self, cert_method: impl Into<String>) -> Self {
        self.cert_method = cert_method.into();
        self
    }

    pub fn with_plus_info(mut self, plus_info: impl Into<String>) -> Self {
        self.plus_info = plus_info.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Check the record can be joined without shifting any position.
    ///
    /// `cpId`, `urlCode`, `certNum` and `date` are required; `certMethod` and
    /// `plusInfo` may be empty. No field may contain `/` or `|` and the
    /// extension must be exactly [`EXTENSION_LEN`] characters.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<(), TokenError> {
        for (name, value) in [
            ("cpId", &self.cp_id),
            ("urlCode", &self.url_code),
            ("certNum", &self.cert_num),
            ("date", &self.date),
        ] {
            if value.trim().is_empty() {
                return Err(TokenError::InvalidInput(format!("{name} is required")));
            }
        }
        for (name, value) in [
            ("cpId", &self.cp_id),
            ("urlCode", &self.url_code),
            ("certNum", &self.cert_num),
            ("date", &self.date),
            ("certMet", &self.cert_method),
            ("plusInfo", &self.plus_info),
            ("extendVar", &self.extension),
        ] {
            if let Some(c) = record::reserved_char(value) {
                return Err(TokenError::InvalidInput(format!(
                    "{name} must not contain '{c}'"
                )));
            }
        }
        if self.extension.chars().count() != EXTENSION_LEN {
            return Err(TokenError::InvalidInput(format!(
                "extendVar must be {EXTENSION_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Positional form, reserved slots included.
    pub fn to_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(REQUEST_FIELD_COUNT);
        fields.extend([
            self.cp_id.as_str(),
            self.url_code.as_str(),
            self.cert_num.as_str(),
            self.date.as_str(),
            self.cert_method.as_str(),
        ]);
        fields.extend([""; REQUEST_RESERVED_SLOTS]);
        fields.extend([self.plus_info.as_str(), self.extension.as_str()]);
        fields
    }
}

/// Identity-verification result returned by the authority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertRecord {
    pub cert_num: String,
    pub date: String,
    pub ci: NestedField,
    pub phone_no: String,
    pub phone_corp: String,
    pub birth: String,
    pub gender: String,
    pub nation: String,
    pub name: String,
    pub result: String,
    pub cert_method: String,
    pub ip: String,
    pub reserve1: String,
    pub reserve2: String,
    pub reserve3: String,
    pub reserve4: String,
    pub plus_info: String,
    pub di: NestedField,
}

impl CertRecord {
    /// Whether the authority reported a successful verification.
    pub fn is_verified(&self) -> bool {
        self.result == RESULT_VERIFIED
    }

    /// Build from exactly [`RESULT_FIELD_COUNT`] positional fields whose CI/DI
    /// slots have already been recovered.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MalformedRecord`] if the count is wrong.
    pub fn from_fields(
        fields: Vec<String>,
        ci: NestedField,
        di: NestedField,
    ) -> Result<Self, TokenError> {
        let fields: [String; RESULT_FIELD_COUNT] =
            fields
                .try_into()
                .map_err(|fields: Vec<String>| TokenError::MalformedRecord {
                    expected: RESULT_FIELD_COUNT,
                    found: fields.len(),
                })?;
        let [cert_num, date, _, phone_no, phone_corp, birth, gender, nation, name, result, cert_method, ip, reserve1, reserve2, reserve3, reserve4, plus_info, _] =
            fields;
        Ok(Self {
            cert_num,
            date,
            ci,
            phone_no,
            phone_corp,
            birth,
            gender,
            nation,
            name,
            result,
            cert_method,
            ip,
            reserve1,
            reserve2,
            reserve3,
            reserve4,
            plus_info,
            di,
        })
    }

    /// Positional form with the given CI/DI slot contents.
    pub fn to_fields<'a>(&'a self, ci: &'a str, di: &'a str) -> [&'a str; RESULT_FIELD_COUNT] {
        [
            &self.cert_num,
            &self.date,
            ci,
            &self.phone_no,
            &self.phone_corp,
            &self.birth,
            &self.gender,
            &self.nation,
            &self.name,
            &self.result,
            &self.cert_method,
            &self.ip,
            &self.reserve1,
            &self.reserve2,
            &self.reserve3,
            &self.reserve4,
            &self.plus_info,
            di,
        ]
    }
}
