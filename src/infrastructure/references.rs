use crate::domain::ports::ReferenceSource;
use uuid::Uuid;

/// Idempotency references backed by random v4 UUIDs.
pub struct UuidReferenceSource;

impl ReferenceSource for UuidReferenceSource {
    fn next_reference(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_are_unique() {
        let source = UuidReferenceSource;
        let a = source.next_reference();
        let b = source.next_reference();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
