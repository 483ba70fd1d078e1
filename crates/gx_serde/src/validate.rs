//! Field validators invoked by generated code.
//!
//! Every validator appends to a [`FieldErrors`] accumulator instead of
//! failing fast, so all problems discovered at one validation point are
//! reported together. The generated field loop calls any number of these
//! between reading a field and the final batch check.
//!
//! # Examples
//!
//! ```
//! use gx_serde::error::FieldErrors;
//! use gx_serde::validate;
//!
//! let mut errors = FieldErrors::new();
//! validate::email("email", "not-an-address", &mut errors);
//! validate::between("age", 250.0, 0.0, 150.0, &mut errors);
//! assert_eq!(errors.len(), 2);
//! ```

use alloc::format;

use crate::error::FieldErrors;

// -----------------------------------------------------------------------------
// String validators

/// The string must contain at least one character.
pub fn non_empty(field: &'static str, value: &str, errors: &mut FieldErrors) {
    if value.is_empty() {
        errors.push(field, "must not be empty");
    }
}

/// The string must contain at least `min` characters.
pub fn min_length(field: &'static str, value: &str, min: usize, errors: &mut FieldErrors) {
    if value.chars().count() < min {
        errors.push(field, format!("must be at least {min} characters"));
    }
}

/// The string must contain at most `max` characters.
pub fn max_length(field: &'static str, value: &str, max: usize, errors: &mut FieldErrors) {
    if value.chars().count() > max {
        errors.push(field, format!("must be at most {max} characters"));
    }
}

/// The string must contain exactly `expected` characters.
pub fn length(field: &'static str, value: &str, expected: usize, errors: &mut FieldErrors) {
    if value.chars().count() != expected {
        errors.push(field, format!("must be exactly {expected} characters"));
    }
}

/// The string must carry no leading or trailing whitespace.
pub fn trimmed(field: &'static str, value: &str, errors: &mut FieldErrors) {
    if value.trim() != value {
        errors.push(field, "must not have leading or trailing whitespace");
    }
}

/// The string must contain no uppercase characters.
pub fn lowercase(field: &'static str, value: &str, errors: &mut FieldErrors) {
    if value.chars().any(char::is_uppercase) {
        errors.push(field, "must be lowercase");
    }
}

/// The string must contain no lowercase characters.
pub fn uppercase(field: &'static str, value: &str, errors: &mut FieldErrors) {
    if value.chars().any(char::is_lowercase) {
        errors.push(field, "must be uppercase");
    }
}

/// Structural email check: a non-empty local part, an `@`, and a domain
/// with an interior dot.
pub fn email(field: &'static str, value: &str, errors: &mut FieldErrors) {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        errors.push(field, "must be a valid email");
    }
}

/// Structural URL check: an alphabetic scheme followed by `://` and a
/// non-empty remainder.
pub fn url(field: &'static str, value: &str, errors: &mut FieldErrors) {
    let valid = match value.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()) && !rest.is_empty()
        }
        None => false,
    };
    if !valid {
        errors.push(field, "must be a valid URL");
    }
}

/// Canonical hyphenated UUID: five hex groups of 8-4-4-4-12 characters.
pub fn uuid(field: &'static str, value: &str, errors: &mut FieldErrors) {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let mut parts = value.split('-');
    let valid = GROUPS.iter().all(|&len| {
        parts
            .next()
            .is_some_and(|part| part.len() == len && part.chars().all(|c| c.is_ascii_hexdigit()))
    }) && parts.next().is_none();

    if !valid {
        errors.push(field, "must be a valid UUID");
    }
}

// -----------------------------------------------------------------------------
// Date validators

/// Plausibility check of an ISO-8601 date: a `YYYY-MM-DD` prefix with an
/// in-range month and day, standing alone or followed by a `T` time part.
fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let all_digits = |range: core::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if !all_digits(0..4) || !all_digits(5..7) || !all_digits(8..10) {
        return false;
    }
    let month = (bytes[5] - b'0') * 10 + (bytes[6] - b'0');
    let day = (bytes[8] - b'0') * 10 + (bytes[9] - b'0');
    (1..=12).contains(&month)
        && (1..=31).contains(&day)
        && (bytes.len() == 10 || bytes[10] == b'T')
}

/// The string must be an ISO-8601 date (`YYYY-MM-DD`, optionally followed
/// by a `T` time part).
pub fn valid_date(field: &'static str, value: &str, errors: &mut FieldErrors) {
    if !is_iso_date(value) {
        errors.push(field, "must be a valid date");
    }
}

/// The date must be strictly after `bound`, both ISO-8601.
///
/// ISO-8601 strings order lexicographically, so the comparison is plain
/// string ordering; a malformed value never satisfies the bound.
pub fn after_date(field: &'static str, value: &str, bound: &str, errors: &mut FieldErrors) {
    if !is_iso_date(value) || value <= bound {
        errors.push(field, format!("must be after {bound}"));
    }
}

/// The date must be strictly before `bound`, both ISO-8601.
pub fn before_date(field: &'static str, value: &str, bound: &str, errors: &mut FieldErrors) {
    if !is_iso_date(value) || value >= bound {
        errors.push(field, format!("must be before {bound}"));
    }
}

// -----------------------------------------------------------------------------
// Number validators

/// The number must be strictly greater than `bound`.
pub fn gt(field: &'static str, value: f64, bound: f64, errors: &mut FieldErrors) {
    if !(value > bound) {
        errors.push(field, format!("must be greater than {bound}"));
    }
}

/// The number must be greater than or equal to `bound`.
pub fn gte(field: &'static str, value: f64, bound: f64, errors: &mut FieldErrors) {
    if !(value >= bound) {
        errors.push(field, format!("must be at least {bound}"));
    }
}

/// The number must be strictly less than `bound`.
pub fn lt(field: &'static str, value: f64, bound: f64, errors: &mut FieldErrors) {
    if !(value < bound) {
        errors.push(field, format!("must be less than {bound}"));
    }
}

/// The number must be less than or equal to `bound`.
pub fn lte(field: &'static str, value: f64, bound: f64, errors: &mut FieldErrors) {
    if !(value <= bound) {
        errors.push(field, format!("must be at most {bound}"));
    }
}

/// The number must lie in the inclusive range `min..=max`.
pub fn between(field: &'static str, value: f64, min: f64, max: f64, errors: &mut FieldErrors) {
    if !(value >= min && value <= max) {
        errors.push(field, format!("must be between {min} and {max}"));
    }
}

/// The number must be a finite integer.
pub fn int(field: &'static str, value: f64, errors: &mut FieldErrors) {
    if !value.is_finite() || value.fract() != 0.0 {
        errors.push(field, "must be an integer");
    }
}

/// The number must be strictly positive.
pub fn positive(field: &'static str, value: f64, errors: &mut FieldErrors) {
    if !(value > 0.0) {
        errors.push(field, "must be positive");
    }
}

/// The number must not be negative.
pub fn non_negative(field: &'static str, value: f64, errors: &mut FieldErrors) {
    if !(value >= 0.0) {
        errors.push(field, "must not be negative");
    }
}

/// The number must be finite (neither NaN nor infinite).
pub fn finite(field: &'static str, value: f64, errors: &mut FieldErrors) {
    if !value.is_finite() {
        errors.push(field, "must be finite");
    }
}

// -----------------------------------------------------------------------------
// Collection validators

/// The collection must hold at least `min` items.
pub fn min_items(field: &'static str, len: usize, min: usize, errors: &mut FieldErrors) {
    if len < min {
        errors.push(field, format!("must have at least {min} items"));
    }
}

/// The collection must hold at most `max` items.
pub fn max_items(field: &'static str, len: usize, max: usize, errors: &mut FieldErrors) {
    if len > max {
        errors.push(field, format!("must have at most {max} items"));
    }
}

/// The collection must hold exactly `expected` items.
pub fn items_count(field: &'static str, len: usize, expected: usize, errors: &mut FieldErrors) {
    if len != expected {
        errors.push(field, format!("must have exactly {expected} items"));
    }
}

// -----------------------------------------------------------------------------
// Tests
