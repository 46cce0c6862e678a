//! Human-readable booking references.

use uuid::Uuid;

/// Prefix shared by every booking reference.
pub const REFERENCE_PREFIX: &str = "NV-";

const REFERENCE_LEN: usize = 8;

/// Generates a booking reference such as `NV-3F9A0C1B`.
///
/// Uniqueness is enforced by the database; a collision fails the insert.
#[must_use]
pub fn generate_reference() -> String {
    let simple = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{REFERENCE_PREFIX}{}", &simple[..REFERENCE_LEN])
}

/// Returns true if `reference` has the generated shape.
#[must_use]
pub fn is_valid_reference(reference: &str) -> bool {
    reference.strip_prefix(REFERENCE_PREFIX).is_some_and(|code| {
        code.len() == REFERENCE_LEN
            && code
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_reference_shape() {
        for _ in 0..50 {
            let reference = generate_reference();
            assert!(is_valid_reference(&reference), "{reference}");
        }
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(!is_valid_reference("NV-abc"));
        assert!(!is_valid_reference("XX-12345678"));
        assert!(!is_valid_reference("NV-1234567g"));
    }
}
