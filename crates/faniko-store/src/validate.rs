use std::sync::LazyLock;

use regex::Regex;

use faniko_types::models::ANONYMOUS_FAN;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+@.+\..+").expect("email pattern compiles"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("username pattern compiles"));

/// Longest tip message kept, in characters.
pub const MAX_TIP_MESSAGE: usize = 500;

/// Longest custom request description kept, in characters.
pub const MAX_REQUEST_MESSAGE: usize = 2000;

/// Trimmed and lowercased; used for emails and usernames.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// Case-insensitive name comparison.
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Fan name for a payment record.
pub fn fan_name(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS_FAN.to_string(),
    }
}

pub fn fan_email(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

/// Non-blank trimmed text.
pub fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
