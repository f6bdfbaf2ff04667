//! Field validators for the note-creation dialog.
//!
//! Pure functions with no I/O: each returns the validated (trimmed) value or
//! a static reason code the caller maps to a user-facing message.

use lazy_static::lazy_static;
use regex::Regex;

/// Upper-exclusive bound on title length in characters
pub const MAX_TITLE_CHARS: usize = 15;
/// Upper-exclusive bound on content length in characters
pub const MAX_CONTENT_CHARS: usize = 700;
/// Upper-exclusive bound on the number of space-delimited tags
pub const MAX_TAG_COUNT: usize = 6;
/// Minimum password length in characters
pub const MIN_PASSWORD_CHARS: usize = 8;
/// The symbols a password may (and must, at least once) contain
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

lazy_static! {
    // Full password alphabet: letters, digits and the allowed symbol set
    static ref PASSWORD_ALPHABET: Regex = Regex::new(r"^[A-Za-z0-9@$!%*?&]+$").unwrap();
}

/// Validates a note title: non-empty and under 15 characters
pub fn validate_title(title: &str) -> Result<String, &'static str> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() >= MAX_TITLE_CHARS {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

/// Validates note content: non-empty and under 700 characters
pub fn validate_content(content: &str) -> Result<String, &'static str> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() >= MAX_CONTENT_CHARS {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

/// Validates the tag line: under 6 space-delimited tokens.
///
/// An empty line is a note without tags and passes.
pub fn validate_tags(tags: &str) -> Result<String, &'static str> {
    let trimmed = tags.trim();

    if trimmed.split_whitespace().count() >= MAX_TAG_COUNT {
        return Err("too_many");
    }

    Ok(trimmed.to_string())
}

/// Validates a password: at least 8 characters, one uppercase letter, one
/// lowercase letter, one digit and one symbol from `@$!%*?&`, with no
/// characters outside that alphabet.
pub fn validate_password(password: &str) -> Result<String, &'static str> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err("too_short");
    }

    if !PASSWORD_ALPHABET.is_match(password) {
        return Err("bad_character");
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("no_uppercase");
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("no_lowercase");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("no_digit");
    }

    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err("no_symbol");
    }

    Ok(password.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_boundary() {
        assert!(validate_title(&"a".repeat(14)).is_ok());
        assert!(validate_title(&"a".repeat(15)).is_err());
        assert_eq!(validate_title(&"a".repeat(15)), Err("too_long"));
    }

    #[test]
    fn test_title_empty() {
        assert_eq!(validate_title(""), Err("empty"));
        assert_eq!(validate_title("   "), Err("empty"));
    }

    #[test]
    fn test_title_trimming() {
        assert_eq!(validate_title("  groceries  ").unwrap(), "groceries");
    }

    #[test]
    fn test_content_boundary() {
        assert!(validate_content(&"a".repeat(699)).is_ok());
        assert_eq!(validate_content(&"a".repeat(700)), Err("too_long"));
    }

    #[test]
    fn test_tags_boundary() {
        assert!(validate_tags("a b c d e").is_ok());
        assert_eq!(validate_tags("a b c d e f"), Err("too_many"));
    }

    #[test]
    fn test_tags_empty_allowed() {
        assert_eq!(validate_tags("").unwrap(), "");
    }

    #[test]
    fn test_password_valid() {
        assert!(validate_password("Abcdef1!").is_ok());
        assert!(validate_password("Str0ng&Pass").is_ok());
    }

    #[test]
    fn test_password_reasons() {
        assert_eq!(validate_password("Ab1!"), Err("too_short"));
        assert_eq!(validate_password("abcdef1!"), Err("no_uppercase"));
        assert_eq!(validate_password("ABCDEF1!"), Err("no_lowercase"));
        assert_eq!(validate_password("Abcdefg!"), Err("no_digit"));
        assert_eq!(validate_password("Abcdefg1"), Err("no_symbol"));
        assert_eq!(validate_password("Abcdef1! "), Err("bad_character"));
    }
}
