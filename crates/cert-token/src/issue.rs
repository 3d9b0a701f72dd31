//! Request-number and timestamp generation for outgoing requests.

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use chrono::{DateTime, TimeZone};

/// `yyyyMMddHHmmss`, the timestamp layout used on the wire.
pub const DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format `now` as a request timestamp.
pub fn generate_date<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format(DATE_FORMAT).to_string()
}

/// Request number: the request timestamp followed by six random digits.
pub fn generate_cert_num<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let suffix = 100_000 + uniform_below(&mut OsRng, 900_000);
    format!("{}{suffix}", generate_date(now))
}

/// Uniform draw from `0..bound`, discarding the top partial range of `u32`.
fn uniform_below<R: RngCore>(rng: &mut R, bound: u32) -> u32 {
    let zone = u32::MAX - u32::MAX % bound;
    loop {
        let v = rng.next_u32();
        if v < zone {
            return v % bound;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 24, 12, 0, 0).unwrap()
    }

    #[test]
    fn date_layout() {
        assert_eq!(generate_date(&fixed_now()), "20251224120000");
    }

    #[test]
    fn cert_num_is_date_plus_six_digits() {
        let num = generate_cert_num(&fixed_now());
        assert_eq!(num.len(), 20);
        assert!(num.starts_with("20251224120000"));
        let suffix: u32 = num[14..].parse().unwrap();
        assert!((100_000..1_000_000).contains(&suffix));
    }

    /// Replays a fixed sequence of `u32` draws.
    struct Scripted(std::vec::IntoIter<u32>);

    impl RngCore for Scripted {
        fn next_u32(&mut self) -> u32 {
            self.0.next().unwrap()
        }
        fn next_u64(&mut self) -> u64 {
            u64::from(self.next_u32())
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(
            &mut self,
            dest: &mut [u8],
        ) -> Result<(), aes_gcm_siv::aead::rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn draws_in_the_partial_top_range_are_discarded() {
        let zone = u32::MAX - u32::MAX % 900_000;
        let mut rng = Scripted(vec![u32::MAX, zone, 900_001].into_iter());
        assert_eq!(uniform_below(&mut rng, 900_000), 1);
    }

    #[test]
    fn draws_below_the_zone_are_reduced() {
        let mut rng = Scripted(vec![899_999].into_iter());
        assert_eq!(uniform_below(&mut rng, 900_000), 899_999);
    }
}
