//! Field validation helpers for request payloads.
//!
//! Lengths are counted in characters, not bytes.

use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("static email pattern is valid")
});

static HEX_COLOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("static color pattern is valid"));

/// Require a non-blank value of at most `max` characters.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` when the rule is broken.
pub fn required(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    max_len(field, value, max)
}

/// Require at most `max` characters.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` when the value is too long.
pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::validation(
            field,
            format!("must be at most {max} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Like [`max_len`] for optional values.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` when the value is too long.
pub fn optional_max_len(field: &'static str, value: Option<&str>, max: usize) -> Result<()> {
    value.map_or(Ok(()), |v| max_len(field, v, max))
}

/// Require `min` to `max` characters.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` when the length is out of range.
pub fn length_between(field: &'static str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::validation(
            field,
            format!("must be between {min} and {max} characters"),
        ));
    }
    Ok(())
}

/// Require `min <= value <= max`.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` when the value is out of range.
pub fn in_range<T: PartialOrd + Display>(field: &'static str, value: T, min: T, max: T) -> Result<()> {
    if value < min || value > max {
        return Err(Error::validation(
            field,
            format!("must be between {min} and {max} (got {value})"),
        ));
    }
    Ok(())
}

/// Require a plausible email address of at most 100 characters.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` when the address is malformed.
pub fn email(field: &'static str, value: &str) -> Result<()> {
    required(field, value, 100)?;
    if !EMAIL_PATTERN.is_match(value.trim()) {
        return Err(Error::validation(field, "must be a valid email address"));
    }
    Ok(())
}

/// Require a `#RRGGBB` color.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` when the color is malformed.
pub fn hex_color(field: &'static str, value: &str) -> Result<()> {
    if !HEX_COLOR_PATTERN.is_match(value) {
        return Err(Error::validation(field, "must be a hex color like #4a90e2"));
    }
    Ok(())
}
