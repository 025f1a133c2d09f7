use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating category slugs
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "supplement", "baby-care", "vitamins2"
    /// - Invalid: "-slug", "slug-", "slug--name", "Slug", "slug_name"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("supplement"));
        assert!(SLUG_REGEX.is_match("baby-care"));
        assert!(SLUG_REGEX.is_match("vitamins2"));
        assert!(SLUG_REGEX.is_match("a"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-slug")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("slug-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("slug--name")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Slug")); // uppercase
        assert!(!SLUG_REGEX.is_match("slug_name")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("slug name")); // space
    }
}
