/// Trims and lowercases a raw query. Inner whitespace is kept as typed, so
/// `"foo  bar"` only matches text containing two spaces.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Case-insensitive substring test; `needle` must already be normalized.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_and_lowercase() {
        assert_eq!(normalize_query("  HeLLo  "), "hello");
    }

    #[test]
    fn inner_whitespace_is_preserved() {
        assert_eq!(normalize_query(" a  b "), "a  b");
    }

    #[test]
    fn substring_ignores_case() {
        assert!(contains_normalized("JavaScript Guide", "script"));
        assert!(!contains_normalized("JavaScript Guide", "rust"));
    }
}
