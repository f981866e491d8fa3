use chrono::{DateTime, Utc};
use rand::Rng;

/// Characters used in the random part of a reference; omits 0/O and 1/I so
/// references survive being read over the phone or copied by hand
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the random suffix
const SUFFIX_LEN: usize = 6;

/// How many fresh references an insert tries before giving up on collisions
pub const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// What a reference identifies; determines its prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Donation,
    Order,
}

impl ReferenceKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ReferenceKind::Donation => "DON",
            ReferenceKind::Order => "ORD",
        }
    }
}

/// Generates a reference such as `DON-20250110-7KQ2MX` for the current day
pub fn generate_reference(kind: ReferenceKind) -> String {
    generate_reference_at(kind, Utc::now())
}

/// Generates a reference dated `at`
pub fn generate_reference_at(kind: ReferenceKind, at: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", kind.prefix(), at.format("%Y%m%d"), suffix)
}

/// Checks that a string has the shape of a reference of the given kind
pub fn is_valid_reference(kind: ReferenceKind, reference: &str) -> bool {
    let mut parts = reference.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix == kind.prefix()
        && date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_format() {
        let at = DateTime::parse_from_rfc3339("2025-01-10T12:00:00Z").unwrap().with_timezone(&Utc);
        let reference = generate_reference_at(ReferenceKind::Donation, at);

        assert!(reference.starts_with("DON-20250110-"));
        assert_eq!(reference.len(), "DON-20250110-".len() + SUFFIX_LEN);
        assert!(is_valid_reference(ReferenceKind::Donation, &reference));
        assert!(!is_valid_reference(ReferenceKind::Order, &reference));
    }

    #[test]
    fn test_rejects_malformed_references() {
        for bad in [
            "",
            "DON",
            "DON-2025011-ABCDEF",
            "DON-20250110-ABCDE",
            "DON-20250110-ABCDE0",
            "DON-20250110-abcdef",
            "DON-20250110-ABCDEF-X",
        ] {
            assert!(!is_valid_reference(ReferenceKind::Donation, bad), "{:?} accepted", bad);
        }
    }

    proptest! {
        #[test]
        fn prop_generated_references_are_valid(secs in 0i64..4_000_000_000i64, order in any::<bool>()) {
            let kind = if order { ReferenceKind::Order } else { ReferenceKind::Donation };
            let at = DateTime::from_timestamp(secs, 0).unwrap();
            let reference = generate_reference_at(kind, at);
            prop_assert!(is_valid_reference(kind, &reference), "{}", reference);
        }
    }
}
