//! Field validation shared by the handlers and stores.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 50;
pub const MAX_MESSAGE_LEN: usize = 5000;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern compiles")
});

static PAGE_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[a-z0-9\-/]*$").expect("page path pattern compiles"));

/// Length in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && char_len(email) <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

/// Page paths start with `/` and contain only lowercase letters, digits, hyphens and slashes.
pub fn is_valid_page_path(path: &str) -> bool {
    PAGE_PATH_RE.is_match(path)
}

/// Canonical form used for path uniqueness checks.
pub fn normalize_path(path: &str) -> String {
    let lowered = path.trim().to_lowercase();
    let trimmed = lowered.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Checks a public contact submission. Inputs are expected to be trimmed.
pub fn validate_contact(name: &str, email: &str, phone: &str, message: &str) -> Result<(), String> {
    if name.is_empty() || char_len(name) > MAX_NAME_LEN {
        return Err("Name is required and must be at most 255 characters".to_string());
    }
    if !is_valid_email(email) {
        return Err("Valid email is required".to_string());
    }
    if char_len(phone) > MAX_PHONE_LEN {
        return Err("Phone must be at most 50 characters".to_string());
    }
    if message.is_empty() || char_len(message) > MAX_MESSAGE_LEN {
        return Err("Message is required and must be at most 5000 characters".to_string());
    }
    Ok(())
}

/// Checks a page name and path. Inputs are expected to be trimmed.
pub fn validate_page_fields(name: &str, path: &str) -> Result<(), String> {
    if name.is_empty() || char_len(name) > MAX_NAME_LEN {
        return Err("Name is required and must be at most 255 characters".to_string());
    }
    if path.is_empty() || !is_valid_page_path(path) {
        return Err(
            "Valid path is required (lowercase letters, numbers, hyphens)".to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("info@pinnaclefinancial.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("two@@example.com"));
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(!is_valid_email(&long));
    }

    #[test]
    fn test_page_path() {
        assert!(is_valid_page_path("/"));
        assert!(is_valid_page_path("/about"));
        assert!(is_valid_page_path("/news/2024-q1"));
        assert!(!is_valid_page_path("about"));
        assert!(!is_valid_page_path("/About"));
        assert!(!is_valid_page_path("/with space"));
        assert!(!is_valid_page_path("/under_score"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/about/"), "/about");
        assert_eq!(normalize_path(" /About "), "/about");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("///"), "/");
    }

    #[test]
    fn test_contact_message_bounds() {
        let ok = "m".repeat(MAX_MESSAGE_LEN);
        assert!(validate_contact("Jo", "jo@example.com", "", &ok).is_ok());

        let too_long = "m".repeat(MAX_MESSAGE_LEN + 1);
        assert!(validate_contact("Jo", "jo@example.com", "", &too_long).is_err());
        assert!(validate_contact("Jo", "jo@example.com", "", "").is_err());
    }

    #[test]
    fn test_contact_other_fields() {
        assert!(validate_contact("", "jo@example.com", "", "hi").is_err());
        assert!(validate_contact(&"n".repeat(256), "jo@example.com", "", "hi").is_err());
        assert!(validate_contact("Jo", "not-an-email", "", "hi").is_err());
        assert!(validate_contact("Jo", "jo@example.com", &"1".repeat(51), "hi").is_err());
        assert!(validate_contact("Jo", "jo@example.com", &"1".repeat(50), "hi").is_ok());
    }

    #[test]
    fn test_page_fields() {
        assert!(validate_page_fields("Team", "/team").is_ok());
        assert!(validate_page_fields("", "/team").is_err());
        assert!(validate_page_fields("Team", "").is_err());
        assert!(validate_page_fields("Team", "team").is_err());
    }
}
