//! Input validation shared by the control-plane components
//!
//! Every check here runs before any storage access.

use std::sync::OnceLock;

use docdesk_db::entities::book::Visibility;
use regex_lite::Regex;

use crate::error::ValidationError;

/// Maximum description length, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Maximum number of labels on a book
pub const MAX_LABELS: usize = 10;

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MAX_PASSWORD_CHARS: usize = 50;

fn account_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{3,50}$").expect("account pattern is valid"))
}

/// Lowercase letter first, then letters, digits, `_` or `-`; fits `book.identify`
fn identify_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z][a-zA-Z0-9_\-]{0,99}$").expect("identify pattern is valid")
    })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\w)+(\.\w+)*@(\w)+((\.\w+)+)$").expect("email pattern is valid")
    })
}

pub fn account(account: &str) -> Result<(), ValidationError> {
    if account_pattern().is_match(account) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAccount)
    }
}

pub fn password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&length) {
        return Err(ValidationError::PasswordLength);
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn email(email: &str) -> Result<(), ValidationError> {
    if email_pattern().is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        Err(ValidationError::DescriptionTooLong)
    } else {
        Ok(())
    }
}

/// Split a `;` separated label list
///
/// Every segment counts toward the limit, blank ones included, so
/// `"a;b;...;j;"` is eleven labels. Blanks are dropped from the result.
pub fn labels(raw: &str) -> Result<Vec<String>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let segments: Vec<&str> = raw.split(';').collect();
    if segments.len() > MAX_LABELS {
        return Err(ValidationError::TooManyLabels);
    }

    Ok(segments
        .into_iter()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn positive_id(id: i32, entity: &'static str) -> Result<i32, ValidationError> {
    if id <= 0 {
        Err(ValidationError::InvalidId(entity))
    } else {
        Ok(id)
    }
}

/// Trimmed book identifier; it ends up verbatim in reader URLs
pub fn identify(identify: &str) -> Result<&str, ValidationError> {
    let identify = identify.trim();
    if identify.is_empty() {
        return Err(ValidationError::MissingIdentify);
    }
    if !identify_pattern().is_match(identify) {
        return Err(ValidationError::InvalidIdentify(identify.to_string()));
    }
    Ok(identify)
}

/// Parse the admin form value: `open` makes a book public, `close` private
pub fn visibility(status: &str) -> Result<Visibility, ValidationError> {
    match status {
        "open" => Ok(Visibility::Public),
        "close" => Ok(Visibility::Private),
        other => Err(ValidationError::InvalidVisibility(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account() {
        assert!(account("alice").is_ok());
        assert!(account("Bob42").is_ok());
        assert_eq!(account("ab"), Err(ValidationError::InvalidAccount));
        assert_eq!(account("has space"), Err(ValidationError::InvalidAccount));
        assert_eq!(account("under_score"), Err(ValidationError::InvalidAccount));
        assert_eq!(account(&"a".repeat(51)), Err(ValidationError::InvalidAccount));
        assert!(account(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_password_mismatch_regardless_of_validity() {
        assert_eq!(
            password("secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            password(&"x".repeat(50), &"y".repeat(50)),
            Err(ValidationError::PasswordMismatch)
        );
        assert!(password("secret1", "secret1").is_ok());
    }

    #[test]
    fn test_password_length() {
        assert_eq!(password("12345", "12345"), Err(ValidationError::PasswordLength));
        assert_eq!(
            password(&"p".repeat(51), &"p".repeat(51)),
            Err(ValidationError::PasswordLength)
        );
        assert!(password("123456", "123456").is_ok());
    }

    #[test]
    fn test_email() {
        assert!(email("alice@example.com").is_ok());
        assert!(email("first.last@mail.example.org").is_ok());
        assert_eq!(email("alice@localhost"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("not-an-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(email(""), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_description_boundary() {
        assert!(description(&"d".repeat(500)).is_ok());
        assert_eq!(
            description(&"d".repeat(501)),
            Err(ValidationError::DescriptionTooLong)
        );
        // counted in characters, not bytes
        assert!(description(&"文".repeat(500)).is_ok());
    }

    #[test]
    fn test_labels() {
        assert_eq!(labels("rust; db ;;docs").unwrap(), vec!["rust", "db", "docs"]);
        assert!(labels("").unwrap().is_empty());

        let ten = vec!["l"; 10].join(";");
        assert_eq!(labels(&ten).unwrap().len(), 10);

        let eleven = vec!["l"; 11].join(";");
        assert_eq!(labels(&eleven), Err(ValidationError::TooManyLabels));
    }

    #[test]
    fn test_blank_label_segments_count() {
        let trailing = format!("{};", vec!["l"; 10].join(";"));
        assert_eq!(labels(&trailing), Err(ValidationError::TooManyLabels));

        assert_eq!(labels(" rust; ").unwrap(), vec!["rust"]);
    }

    #[test]
    fn test_visibility() {
        assert_eq!(visibility("open"), Ok(Visibility::Public));
        assert_eq!(visibility("close"), Ok(Visibility::Private));
        assert_eq!(
            visibility("public"),
            Err(ValidationError::InvalidVisibility("public".to_string()))
        );
    }

    #[test]
    fn test_identify_rejects_url_syntax() {
        for bad in ["a b", "a/../x", "x?token=evil", "frag#1", "a&b=c", "1book", "Book", "-x"] {
            assert_eq!(
                identify(bad),
                Err(ValidationError::InvalidIdentify(bad.to_string())),
                "{} should be rejected",
                bad
            );
        }
        assert!(identify(&"a".repeat(101)).is_err());
        assert!(identify(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_ids_and_identify() {
        assert_eq!(positive_id(0, "book"), Err(ValidationError::InvalidId("book")));
        assert_eq!(positive_id(4, "book"), Ok(4));
        assert_eq!(identify("  "), Err(ValidationError::MissingIdentify));
        assert_eq!(identify(" proj-x "), Ok("proj-x"));
        assert_eq!(identify("handbook_V2"), Ok("handbook_V2"));
    }
}
