//! Label normalization (spec.md §4.8): reference labels and metadata keys
//! are matched case- and whitespace-insensitively, so every lookup and
//! every insertion goes through the same canonical form first.

/// Lowercase ASCII, dropping every byte outside `[A-Za-z0-9_.-]`.
/// `[Foo Bar]`, `[foo-bar]` and `[FOO!BAR]` all resolve to `"foobar"` —
/// whitespace and punctuation carry no meaning in a label, so they're
/// removed rather than preserved as a separator.
pub fn normalize_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '-' {
            out.push(ch.to_ascii_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lowercases_and_strips_whitespace() {
        assert_eq!(normalize_label("  My   Link  "), "mylink");
    }

    #[test]
    fn strips_disallowed_punctuation() {
        assert_eq!(normalize_label("a!b"), "ab");
    }

    #[test]
    fn matches_the_canonicalization_invariant() {
        assert_eq!(normalize_label("Foo Bar"), normalize_label("foo-bar"));
        assert_eq!(normalize_label("Foo Bar"), "foobar");
    }

    #[test]
    fn distinct_labels_stay_distinct() {
        assert_ne!(normalize_label("foo"), normalize_label("bar"));
    }
}
