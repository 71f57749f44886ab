//! Numeric input violations reported by registration and login.
//!
//! Codes are part of the public API: clients switch on them to render
//! localized messages, so existing values must never be renumbered.

use std::fmt;

use serde::Serialize;

/// A single rejected input condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u16")]
pub enum Violation {
    EmptyUsername,
    InvalidUsername,
    UsernameTaken,
    EmptyPassword,
    PasswordTooShort,
    PasswordMismatch,
    InvalidEmail,
    EmailTaken,
}

impl Violation {
    /// Stable numeric code
    pub fn code(self) -> u16 {
        match self {
            Violation::EmptyUsername => 1,
            Violation::InvalidUsername => 2,
            Violation::UsernameTaken => 3,
            Violation::EmptyPassword => 4,
            Violation::PasswordTooShort => 5,
            Violation::PasswordMismatch => 6,
            Violation::InvalidEmail => 7,
            Violation::EmailTaken => 8,
        }
    }

    /// Human readable description
    pub fn message(self) -> &'static str {
        match self {
            Violation::EmptyUsername => "username is required",
            Violation::InvalidUsername => "username has an invalid length or characters",
            Violation::UsernameTaken => "username is already taken",
            Violation::EmptyPassword => "password is required",
            Violation::PasswordTooShort => "password is too short",
            Violation::PasswordMismatch => "password confirmation does not match",
            Violation::InvalidEmail => "email address is invalid",
            Violation::EmailTaken => "email address is already registered",
        }
    }
}

impl From<Violation> for u16 {
    fn from(violation: Violation) -> Self {
        violation.code()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message(), self.code())
    }
}

/// Ordered, duplicate-free collection of violations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation; repeated violations are kept once
    pub fn push(&mut self, violation: Violation) {
        if !self.0.contains(&violation) {
            self.0.push(violation);
            self.0.sort();
        }
    }

    pub fn extend(&mut self, other: Violations) {
        for violation in other.0 {
            self.push(violation);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, violation: Violation) -> bool {
        self.0.contains(&violation)
    }

    pub fn iter(&self) -> impl Iterator<Item = Violation> + '_ {
        self.0.iter().copied()
    }

    /// Numeric codes in ascending order
    pub fn codes(&self) -> Vec<u16> {
        self.0.iter().map(|v| v.code()).collect()
    }

    /// `Ok(())` when nothing was recorded, otherwise the collection as an error
    pub fn into_result(self) -> Result<(), Violations> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        let mut violations = Violations::new();
        for violation in iter {
            violations.push(violation);
        }
        violations
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_sorted_and_unique() {
        let mut violations = Violations::new();
        violations.push(Violation::PasswordMismatch);
        violations.push(Violation::EmptyUsername);
        violations.push(Violation::PasswordMismatch);

        assert_eq!(violations.codes(), vec![1, 6]);
    }

    #[test]
    fn test_into_result() {
        assert!(Violations::new().into_result().is_ok());

        let violations: Violations = [Violation::EmailTaken].into_iter().collect();
        let err = violations.into_result().unwrap_err();
        assert!(err.contains(Violation::EmailTaken));
    }

    #[test]
    fn test_serializes_as_codes() {
        let violations: Violations = [Violation::InvalidEmail, Violation::EmptyPassword]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&violations).unwrap();
        assert_eq!(json, "[4,7]");
    }
}
