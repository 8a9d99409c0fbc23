//! Generated identifiers for citizen-filed records: certificate request
//! numbers and complaint reference numbers.

use rand::Rng;
use sqlx::{Postgres, Transaction};

use crate::database::manager::DatabaseError;

/// Two-letter uppercase prefix derived from the certificate type, e.g.
/// "barangay clearance" -> "BA".
pub fn request_number_prefix(certificate_type: &str) -> String {
    certificate_type
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

pub fn format_request_number(certificate_type: &str, sequence: i64) -> String {
    format!("{}-{:03}", request_number_prefix(certificate_type), sequence)
}

/// Allocate the next request number for a certificate type.
///
/// The per-type counter row is bumped with an atomic upsert inside the
/// caller's transaction, so two concurrent filings of the same type can
/// never observe the same sequence value.
pub async fn next_request_number(
    tx: &mut Transaction<'_, Postgres>,
    certificate_type: &str,
) -> Result<String, DatabaseError> {
    let (sequence,): (i64,) = sqlx::query_as(
        "INSERT INTO certificate_counters (certificate_type, counter) VALUES ($1, 1)
         ON CONFLICT (certificate_type) DO UPDATE SET counter = certificate_counters.counter + 1
         RETURNING counter",
    )
    .bind(certificate_type)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format_request_number(certificate_type, sequence))
}

/// Random complaint reference: `REF-` plus 8 uppercase hex characters.
/// Collisions are resolved by the caller retrying against the unique
/// constraint on `complaints.reference_number`.
pub fn new_reference_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| {
            let digit = rng.gen_range(0..16u8);
            std::char::from_digit(digit as u32, 16).unwrap().to_ascii_uppercase()
        })
        .collect();
    format!("REF-{}", suffix)
}

/// Bounded attempts when the reference-number insert hits the unique
/// constraint. Collisions are vanishingly rare at 16^8 values; more than a
/// couple in a row means something else is wrong.
pub const REFERENCE_NUMBER_ATTEMPTS: u32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_two_uppercase_letters() {
        assert_eq!(request_number_prefix("barangay clearance"), "BA");
        assert_eq!(request_number_prefix("indigency"), "IN");
        assert_eq!(request_number_prefix("x"), "X");
    }

    #[test]
    fn request_number_is_zero_padded() {
        assert_eq!(format_request_number("residency", 7), "RE-007");
        assert_eq!(format_request_number("residency", 123), "RE-123");
        assert_eq!(format_request_number("residency", 1000), "RE-1000");
    }

    #[test]
    fn reference_number_shape() {
        for _ in 0..100 {
            let reference = new_reference_number();
            assert_eq!(reference.len(), 12);
            assert!(reference.starts_with("REF-"));
            assert!(reference[4..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
    }

    #[test]
    fn reference_numbers_vary() {
        let a = new_reference_number();
        let b = new_reference_number();
        let c = new_reference_number();
        assert!(a != b || b != c, "three identical random references");
    }
}
