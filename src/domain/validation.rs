//! Stateless content rules for post titles, bodies and tags.

use std::collections::HashSet;

use super::error::{DomainError, FieldViolation};

pub const MAX_TITLE_CHARS: usize = 80;
pub const MAX_BODY_CHARS: usize = 2000;
pub const MAX_TAGS: usize = 5;
pub const MAX_TAG_CHARS: usize = 24;

/// Words rejected anywhere in a title or body (case-insensitive).
pub const FORBIDDEN_WORDS: &[&str] = &["캄보디아", "프놈펜", "불법체류", "텔레그램"];

pub fn contains_forbidden_words(text: &str) -> bool {
    let lower = text.to_lowercase();
    FORBIDDEN_WORDS
        .iter()
        .any(|word| lower.contains(&word.to_lowercase()))
}

/// Validate a complete post draft. Every failing field is reported.
pub fn validate_post(title: &str, body: &str) -> Result<(), DomainError> {
    let violations: Vec<FieldViolation> = [
        check_text("title", title, MAX_TITLE_CHARS),
        check_text("body", body, MAX_BODY_CHARS),
    ]
    .into_iter()
    .flatten()
    .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(violations))
    }
}

/// Validate only the fields present in a partial update.
pub fn validate_patch(title: Option<&str>, body: Option<&str>) -> Result<(), DomainError> {
    let violations: Vec<FieldViolation> = [
        title.and_then(|value| check_text("title", value, MAX_TITLE_CHARS)),
        body.and_then(|value| check_text("body", value, MAX_BODY_CHARS)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(violations))
    }
}

fn check_text(field: &'static str, value: &str, max_chars: usize) -> Option<FieldViolation> {
    let message = if value.trim().is_empty() {
        format!("{field} is required")
    } else if value.chars().count() > max_chars {
        format!("{field} must be at most {max_chars} characters")
    } else if contains_forbidden_words(value) {
        format!("{field} contains a forbidden word")
    } else {
        return None;
    };
    Some(FieldViolation { field, message })
}

/// Lenient tag cleanup: trim, drop blanks, keep the first occurrence of each
/// value, take the first five, then drop any longer than 24 characters.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    unique_trimmed(tags)
        .into_iter()
        .take(MAX_TAGS)
        .filter(|tag| tag.chars().count() <= MAX_TAG_CHARS)
        .collect()
}

/// Strict variant used for user input: too many or too long tags are errors
/// rather than silently dropped.
pub fn validate_tags<S: AsRef<str>>(tags: &[S]) -> Result<Vec<String>, DomainError> {
    let unique = unique_trimmed(tags);
    let mut violations = Vec::new();

    if unique.len() > MAX_TAGS {
        violations.push(FieldViolation {
            field: "tags",
            message: format!("at most {MAX_TAGS} tags are allowed"),
        });
    }
    if let Some(long) = unique
        .iter()
        .find(|tag| tag.chars().count() > MAX_TAG_CHARS)
    {
        violations.push(FieldViolation {
            field: "tags",
            message: format!("tag `{long}` exceeds {MAX_TAG_CHARS} characters"),
        });
    }

    if violations.is_empty() {
        Ok(unique)
    } else {
        Err(DomainError::Validation(violations))
    }
}

/// Split a comma-separated tag list as typed on the command line.
pub fn split_tag_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

fn unique_trimmed<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|tag| tag.as_ref().trim())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}
