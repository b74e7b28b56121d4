//! Name and email validation mirroring backend constraints.
//!
//! The backend rejects users whose name or email is blank after trimming.
//! Generated data is held to a stricter standard so it also renders well in
//! the dashboard avatars.
//!
//! # Validation Rules
//!
//! - Names: 1 to [`USER_NAME_MAX`] characters, letters, spaces, hyphens and
//!   apostrophes only, not whitespace-only
//! - Emails: exactly one `@`, a non-empty local part of ASCII alphanumerics
//!   and dots, and a dotted domain

/// Maximum allowed length for a generated user name.
pub const USER_NAME_MAX: usize = 64;

/// Validates a user name against the generation rules.
///
/// # Examples
///
/// ```
/// use example_data::is_valid_user_name;
///
/// assert!(is_valid_user_name("Ada Lovelace"));
/// assert!(is_valid_user_name("Miles O'Brien"));
/// assert!(!is_valid_user_name("   "));
/// assert!(!is_valid_user_name("R2-D2"));
/// ```
#[must_use]
pub fn is_valid_user_name(name: &str) -> bool {
    let length = name.chars().count();
    if length == 0 || length > USER_NAME_MAX {
        return false;
    }
    if name.trim().is_empty() {
        return false;
    }
    name.chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
}

/// Validates an email address produced by the generator.
///
/// # Examples
///
/// ```
/// use example_data::is_valid_email;
///
/// assert!(is_valid_email("ada.lovelace@example.com"));
/// assert!(!is_valid_email("ada@localhost"));
/// assert!(!is_valid_email("@example.com"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.')
        && is_valid_email_domain(domain)
}

/// Returns `true` when `domain` can follow the `@` of a generated address.
pub(crate) fn is_valid_email_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Builds the dotted local part for a name, e.g. `ada.lovelace`.
///
/// Characters outside ASCII alphanumerics are dropped; words that end up
/// empty are skipped.
pub(crate) fn email_local_part(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Ada Lovelace", true)]
    #[case("Mary-Jane Watson", true)]
    #[case("Zoë Ørsted", true)]
    #[case("", false)]
    #[case("  ", false)]
    #[case("user_123", false)]
    fn user_name_rules(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_valid_user_name(name), expected);
    }

    #[test]
    fn rejects_overlong_names() {
        let name = "a".repeat(USER_NAME_MAX + 1);
        assert!(!is_valid_user_name(&name));
    }

    #[rstest]
    #[case("ada.lovelace@example.com", true)]
    #[case("ada2@acme-payroll.test", true)]
    #[case("Ada@example.com", false)]
    #[case("ada@@example.com", false)]
    #[case("ada@example", false)]
    #[case("ada@.example.com", false)]
    #[case("ada", false)]
    fn email_rules(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(email), expected);
    }

    #[rstest]
    #[case("Ada Lovelace", "ada.lovelace")]
    #[case("Miles O'Brien", "miles.obrien")]
    #[case("Zoë  Smith", "zo.smith")]
    #[case("'' Smith", "smith")]
    fn local_part_is_dotted_and_lowercase(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(email_local_part(name), expected);
    }
}
