//! Display-name validation.
//!
//! Every entry point that persists a display name runs it through
//! [`validate_username`] first; nothing downstream re-checks.

/// Characters allowed besides ASCII alphanumerics.
const ALLOWED_PUNCTUATION: &str = " _.,-";

/// Substrings rejected outright (case-sensitive). Guards against names
/// that could be replayed into shells or script contexts elsewhere.
const DANGEROUS_PATTERNS: [&str; 16] = [
    ";", "&", "|", ">", "<", "$", "`", "\\", "eval", "exec", "System", "bash", "cmd", "powershell",
    "script", "function",
];

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 20;

/// Validates a display name, returning the rejection reason on failure.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("Username cannot be empty");
    }

    let length = username.chars().count();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err("Username must be between 3 and 20 characters");
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(c))
    {
        return Err(
            "Username contains invalid characters. Use only letters, numbers, spaces, and basic punctuation",
        );
    }

    if DANGEROUS_PATTERNS.iter().any(|p| username.contains(p)) {
        return Err("Username contains invalid characters");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_username("Alice").is_ok());
        assert!(validate_username("Bob Smith").is_ok());
        assert!(validate_username("player_1.5, ok-").is_ok());
    }

    #[test]
    fn rejects_empty_and_short_names() {
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
    }

    #[test]
    fn rejects_overlong_names() {
        assert!(validate_username(&"a".repeat(20)).is_ok());
        assert!(validate_username(&"a".repeat(21)).is_err());
    }

    #[test]
    fn rejects_unsafe_characters() {
        assert!(validate_username("Robert';DROP").is_err());
        assert!(validate_username("a|b|c").is_err());
        assert!(validate_username("tick`tock").is_err());
        assert!(validate_username("über").is_err());
    }

    #[test]
    fn rejects_dangerous_substrings() {
        assert!(validate_username("Revaluation").is_err()); // contains "eval"
        assert!(validate_username("bash fan").is_err());
        assert!(validate_username("executive").is_err()); // contains "exec"
    }

    #[test]
    fn dangerous_substrings_are_case_sensitive() {
        assert!(validate_username("EVAL master").is_ok());
        assert!(validate_username("Bash fan").is_ok());
        assert!(validate_username("system ok").is_ok()); // "System" is upper-case in the list
    }
}
