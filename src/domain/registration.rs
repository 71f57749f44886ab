//! Registration input and its format rules.
//!
//! Availability (username/email already taken) needs the database and is
//! checked by the auth service; everything else lives here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::violation::{Violation, Violations};
use crate::config::{MAX_EMAIL_LENGTH, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};

static USERNAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username pattern"));

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern")
});

/// Account registration request
///
/// The `validate` caps only bound payload size; format rules are reported
/// as violation codes by [`Registration::check`].
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct Registration {
    #[validate(length(max = 1024, message = "username is too long"))]
    #[schema(example = "jdoe")]
    pub username: String,
    #[validate(length(max = 1024, message = "email is too long"))]
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    #[validate(length(max = 1024, message = "password is too long"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[validate(length(max = 1024, message = "password confirmation is too long"))]
    #[schema(example = "SecurePass123!")]
    pub password_confirmation: String,
}

impl Registration {
    /// Trim the username and normalize the email address
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self
    }

    /// Collect every format violation of this request
    pub fn check(&self) -> Violations {
        let mut violations = check_username(&self.username);
        violations.extend(check_new_password(&self.password, &self.password_confirmation));
        if let Err(violation) = check_email(&self.email) {
            violations.push(violation);
        }
        violations
    }
}

/// Username format rules (codes 1 and 2)
pub fn check_username(username: &str) -> Violations {
    let mut violations = Violations::new();
    let username = username.trim();
    let length = username.chars().count();

    if username.is_empty() {
        violations.push(Violation::EmptyUsername);
    } else if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&length)
        || !USERNAME_CHARS.is_match(username)
    {
        violations.push(Violation::InvalidUsername);
    }

    violations
}

/// Password rules for a new password (codes 4, 5 and 6)
pub fn check_new_password(password: &str, confirmation: &str) -> Violations {
    let mut violations = Violations::new();

    if password.is_empty() {
        violations.push(Violation::EmptyPassword);
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(Violation::PasswordTooShort);
    }
    if password != confirmation {
        violations.push(Violation::PasswordMismatch);
    }

    violations
}

/// Email format rule (code 7)
pub fn check_email(email: &str) -> Result<(), Violation> {
    let email = email.trim();
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || !EMAIL_SHAPE.is_match(email) {
        return Err(Violation::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(username: &str, email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirmation: confirm.to_string(),
        }
    }

    #[test]
    fn test_valid_registration_has_no_violations() {
        let reg = registration("jdoe", "jdoe@example.com", "Password123", "Password123");
        assert!(reg.check().is_empty());
    }

    #[test]
    fn test_empty_username_yields_code_1() {
        let reg = registration("", "jdoe@example.com", "Password123", "Password123");
        assert_eq!(reg.check().codes(), vec![1]);
    }

    #[test]
    fn test_whitespace_username_counts_as_empty() {
        let reg = registration("   ", "jdoe@example.com", "Password123", "Password123");
        assert_eq!(reg.check().codes(), vec![1]);
    }

    #[test]
    fn test_invalid_username_yields_code_2() {
        for name in ["ab", "has space", "semi;colon", &"x".repeat(33)] {
            let reg = registration(name, "jdoe@example.com", "Password123", "Password123");
            assert_eq!(reg.check().codes(), vec![2], "username {:?}", name);
        }
    }

    #[test]
    fn test_password_rules() {
        let reg = registration("jdoe", "jdoe@example.com", "", "");
        assert_eq!(reg.check().codes(), vec![4]);

        let reg = registration("jdoe", "jdoe@example.com", "short", "short");
        assert_eq!(reg.check().codes(), vec![5]);

        let reg = registration("jdoe", "jdoe@example.com", "Password123", "Password124");
        assert_eq!(reg.check().codes(), vec![6]);
    }

    #[test]
    fn test_invalid_email_yields_code_7() {
        for email in ["", "no-at-sign", "a@b", "two@@example.com"] {
            let reg = registration("jdoe", email, "Password123", "Password123");
            assert_eq!(reg.check().codes(), vec![7], "email {:?}", email);
        }
    }

    #[test]
    fn test_all_violations_reported_together() {
        let reg = registration("", "bogus", "short", "other");
        assert_eq!(reg.check().codes(), vec![1, 5, 6, 7]);
    }

    #[test]
    fn test_normalized() {
        let reg = registration("  jdoe ", " JDoe@Example.COM ", "p", "p").normalized();
        assert_eq!(reg.username, "jdoe");
        assert_eq!(reg.email, "jdoe@example.com");
    }
}
