use arcade_fs::{ILLEGAL_COMPONENT_CHARS, NormalizedPath, sanitize_component};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_normalization_invariants(s in "\\PC*") {
        let path = NormalizedPath::new(&s);

        // No backslashes survive normalization
        prop_assert!(!path.as_str().contains('\\'));

        // Native round trip is stable
        let roundtripped = NormalizedPath::new(path.to_native());
        prop_assert_eq!(path, roundtripped);
    }

    #[test]
    fn test_sanitized_names_are_legal(s in "\\PC*") {
        let sanitized = sanitize_component(&s);

        prop_assert!(!sanitized.value.chars().any(|c| ILLEGAL_COMPONENT_CHARS.contains(&c)));
        prop_assert!(!sanitized.value.starts_with('.'));
        // Replacement is one-for-one
        prop_assert_eq!(sanitized.value.chars().count(), s.chars().count());
        let expected = s.chars().filter(|c| ILLEGAL_COMPONENT_CHARS.contains(c)).count()
            + usize::from(s.starts_with('.'));
        prop_assert_eq!(sanitized.replaced.len(), expected);
    }

    #[test]
    fn test_sanitize_is_idempotent(s in "\\PC*") {
        let once = sanitize_component(&s);
        let twice = sanitize_component(&once.value);
        prop_assert_eq!(&once.value, &twice.value);
        prop_assert!(!twice.changed());
    }
}
