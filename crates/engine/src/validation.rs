//! Attribute rules for users and microposts.
//!
//! Every check appends to a [`ValidationErrors`] instead of returning on the
//! first failure, so callers can report all broken fields at once.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const MICROPOST_MAX_CHARS: usize = 140;

/// ASCII only (`-u`): `\w`, `\d` and case folding never match non-ASCII
/// characters.
static EMAIL_FORMAT: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?i-u)\A[\w+\-.]+@[a-z\d\-]+(\.[a-z\d\-]+)*\.[a-z]+\z")
});

/// Field name → messages, ordered by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// Messages prefixed with the humanized field name, e.g.
    /// `"Password confirmation doesn't match Password"`.
    pub fn full_messages(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(field, messages)| {
                let label = humanize(field);
                messages
                    .iter()
                    .map(move |message| format!("{label} {message}"))
            })
            .collect()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Canonical stored form of an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email_format(email: &str) -> bool {
    match EMAIL_FORMAT.as_ref() {
        Ok(re) => re.is_match(email),
        Err(_) => false,
    }
}

pub(crate) fn check_name(errors: &mut ValidationErrors, name: &str) {
    if is_blank(name) {
        errors.add("name", "can't be blank");
    }
    if name.chars().count() > NAME_MAX_CHARS {
        errors.add(
            "name",
            format!("is too long (maximum is {NAME_MAX_CHARS} characters)"),
        );
    }
}

/// Expects the already normalized address.
pub(crate) fn check_email(errors: &mut ValidationErrors, email: &str) {
    if is_blank(email) {
        errors.add("email", "can't be blank");
        return;
    }
    if email.chars().count() > EMAIL_MAX_CHARS {
        errors.add(
            "email",
            format!("is too long (maximum is {EMAIL_MAX_CHARS} characters)"),
        );
    }
    if !is_valid_email_format(email) {
        errors.add("email", "is invalid");
    }
}

pub(crate) fn check_password(
    errors: &mut ValidationErrors,
    password: &str,
    confirmation: Option<&str>,
) {
    if is_blank(password) {
        errors.add("password", "can't be blank");
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!("is too short (minimum is {PASSWORD_MIN_CHARS} characters)"),
        );
    }
    if let Some(confirmation) = confirmation
        && confirmation != password
    {
        errors.add("password_confirmation", "doesn't match Password");
    }
}

pub(crate) fn check_micropost_content(errors: &mut ValidationErrors, content: &str) {
    if is_blank(content) {
        errors.add("content", "can't be blank");
    }
    if content.chars().count() > MICROPOST_MAX_CHARS {
        errors.add(
            "content",
            format!("is too long (maximum is {MICROPOST_MAX_CHARS} characters)"),
        );
    }
}
