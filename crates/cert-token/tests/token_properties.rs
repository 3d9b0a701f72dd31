use std::sync::Arc;
use std::thread;

use cert_token::schema::RESULT_FIELD_COUNT;
use cert_token::{
    CertCipher, CertRecord, NestedField, RequestRecord, SivCipher, TokenDecoder, TokenEncoder,
    TokenError,
};
use proptest::prelude::*;

const BASE64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.";

fn cipher() -> SivCipher {
    SivCipher::new(&[0x11u8; 32], &[0x22u8; 12], b"tag-key-for-tests-0123456789").unwrap()
}

fn example_request() -> RequestRecord {
    RequestRecord::new("MMST1001", "015001", "TEST1234567890", "20251224120000")
        .with_cert_method("M")
        .with_plus_info("")
        .with_extension("0000000000000000")
}

/// Field content that never contains the record delimiter.
fn plain_field() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .:=@가-힣-]{0,12}"
}

/// CI/DI plaintext, delimiter allowed.
fn nested_field() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9+/=]{0,24}"
}

fn cert_record() -> impl Strategy<Value = CertRecord> {
    (
        prop::collection::vec(plain_field(), RESULT_FIELD_COUNT - 2),
        nested_field(),
        nested_field(),
    )
        .prop_map(|(f, ci, di)| CertRecord {
            cert_num: f[0].clone(),
            date: f[1].clone(),
            ci: NestedField::from(ci.as_str()),
            phone_no: f[2].clone(),
            phone_corp: f[3].clone(),
            birth: f[4].clone(),
            gender: f[5].clone(),
            nation: f[6].clone(),
            name: f[7].clone(),
            result: f[8].clone(),
            cert_method: f[9].clone(),
            ip: f[10].clone(),
            reserve1: f[11].clone(),
            reserve2: f[12].clone(),
            reserve3: f[13].clone(),
            reserve4: f[14].clone(),
            plus_info: f[15].clone(),
            di: NestedField::from(di.as_str()),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn result_round_trips(record in cert_record()) {
        let cipher = cipher();
        let token = TokenEncoder::new(&cipher).encode_result(&record).unwrap();
        let decoded = TokenDecoder::new(&cipher).decode(token.as_str()).unwrap();
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn single_character_tamper_is_rejected(pos in any::<prop::sample::Index>(), sub in 0..BASE64URL.len()) {
        let cipher = cipher();
        let token = TokenEncoder::new(&cipher).encode_request(&example_request()).unwrap();
        let mut bytes = token.as_str().as_bytes().to_vec();
        let idx = pos.index(bytes.len());
        let replacement = BASE64URL[sub];
        prop_assume!(bytes[idx] != replacement);
        bytes[idx] = replacement;
        let tampered = String::from_utf8(bytes).unwrap();

        let decoder = TokenDecoder::new(&cipher);
        prop_assert!(decoder.decode(&tampered).is_err());
        prop_assert!(decoder.decode_piped(&tampered).is_err());
    }
}

#[test]
fn example_request_encodes_to_opaque_token() {
    let cipher = cipher();
    let token = TokenEncoder::new(&cipher)
        .encode_request(&example_request())
        .unwrap();
    assert!(!token.as_str().is_empty());

    let piped = TokenDecoder::new(&cipher)
        .decode_piped(token.as_str())
        .unwrap();
    assert!(piped.starts_with("MMST1001|015001|TEST1234567890|20251224120000|M|"));
}

#[test]
fn token_from_other_key_is_rejected() {
    let other = SivCipher::new(&[0x33u8; 32], &[0x22u8; 12], b"tag-key-for-tests-0123456789").unwrap();
    let token = TokenEncoder::new(&other)
        .encode_request(&example_request())
        .unwrap();
    assert!(matches!(
        TokenDecoder::new(&cipher()).decode(token.as_str()),
        Err(TokenError::CipherFailure { .. })
    ));
}

#[test]
fn forged_tag_with_valid_outer_layer_is_rejected() {
    let cipher = cipher();
    let inner = cipher.encrypt(&vec![""; RESULT_FIELD_COUNT].join("/")).unwrap();
    let forged = cipher
        .encrypt(&format!("{inner}/{}/0000000000000000", "0".repeat(64)))
        .unwrap();
    assert_eq!(
        TokenDecoder::new(&cipher).decode(&forged),
        Err(TokenError::IntegrityCheckFailed)
    );
}

#[test]
fn concurrent_calls_share_one_cipher() {
    let cipher: Arc<dyn CertCipher> = Arc::new(cipher());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cipher = Arc::clone(&cipher);
            thread::spawn(move || {
                let record = CertRecord {
                    cert_num: format!("REQ{i}"),
                    ci: NestedField::from(format!("ci/{i}").as_str()),
                    ..CertRecord::default()
                };
                let token = TokenEncoder::new(cipher.as_ref())
                    .encode_result(&record)
                    .unwrap();
                let decoded = TokenDecoder::new(cipher.as_ref())
                    .decode(token.as_str())
                    .unwrap();
                assert_eq!(decoded, record);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
