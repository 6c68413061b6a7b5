//! Field-error accumulator shared by registration and form validation.
//!
//! Every rule runs; nothing fails fast. Callers get the complete field → message
//! map back so all problems can be shown at once.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$";

#[allow(
    clippy::expect_used,
    reason = "EMAIL_PATTERN is a literal covered by test_email_pattern_compiles"
)]
fn email_regex() -> Regex {
    Regex::new(EMAIL_PATTERN).expect("email pattern compiles")
}

lazy_static! {
    /// Email shape accepted at registration.
    pub static ref EMAIL_REGEX: Regex = email_regex();
}

/// Maximum name length, in characters.
pub const NAME_MAX_CHARS: usize = 255;
/// Minimum password length, in bytes.
pub const PASSWORD_MIN_BYTES: usize = 6;
/// Maximum password length, in bytes. bcrypt ignores anything past this.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Collects at most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    field_errors: BTreeMap<String, String>,
}

impl Validator {
    /// Creates an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` iff `failed` is true.
    pub fn check(&mut self, failed: bool, field: &str, message: &str) {
        if failed {
            self.add_error(field, message);
        }
    }

    /// Records `message` for `field` unless `value` matches `pattern`.
    pub fn matches(&mut self, pattern: &Regex, value: &str, field: &str, message: &str) {
        self.check(!pattern.is_match(value), field, message);
    }

    /// Records an error. The first message recorded for a field is kept.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Whether any field failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.field_errors.is_empty()
    }

    /// The message recorded for `field`, if any.
    #[must_use]
    pub fn get_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    /// All recorded errors, ordered by field name.
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    /// Converts into `Err(Error::Validation)` when anything failed.
    pub fn into_result(self) -> crate::errors::Result<()> {
        if self.has_errors() {
            Err(crate::errors::Error::Validation(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for ")?;
        let fields: Vec<&str> = self.field_errors.keys().map(String::as_str).collect();
        write!(f, "{}", fields.join(", "))
    }
}

/// Name: non-empty, at most 255 characters.
pub fn validate_name(v: &mut Validator, name: &str) {
    v.check(name.is_empty(), "name", "Name cannot be empty");
    v.check(
        name.chars().count() > NAME_MAX_CHARS,
        "name",
        "Name cannot be more than 255 characters",
    );
}

/// Email: must look like an address.
pub fn validate_email(v: &mut Validator, email: &str) {
    v.matches(&EMAIL_REGEX, email, "email", "Must be a valid email");
}

/// Password: 6 to 72 bytes inclusive.
pub fn validate_password(v: &mut Validator, password: &str) {
    v.check(
        password.len() < PASSWORD_MIN_BYTES,
        "password",
        "Password must be at least 6 characters",
    );
    v.check(
        password.len() > PASSWORD_MAX_BYTES,
        "password",
        "Password must be at most 72 characters",
    );
}
