//! Value-level sanitization for contact and categorical fields.

use once_cell::sync::Lazy;
use regex::Regex;

// Compiled once at startup
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid regex: email")
});

/// Every accepted spelling, matched exactly after trimming. The canonical
/// labels map onto themselves so a cleaned column maps the same way again.
const GENDER_LOOKUP: [(&str, &str); 10] = [
    ("M", "Male"),
    ("m", "Male"),
    ("male", "Male"),
    ("MALE", "Male"),
    ("Male", "Male"),
    ("F", "Female"),
    ("f", "Female"),
    ("female", "Female"),
    ("FEMALE", "Female"),
    ("Female", "Female"),
];

/// Whether a value is a syntactically valid `local-part@domain.tld` address.
pub(crate) fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Strip every non-digit character. An empty result means "no phone number".
pub(crate) fn digits_only(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() { None } else { Some(digits) }
}

/// Title-case and trim a label.
///
/// A word starts at every letter that follows a non-letter, so
/// `"credit_card"` becomes `"Credit_Card"` and `"o'neil"` becomes `"O'Neil"`.
pub(crate) fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_is_letter = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }

    out.trim().to_string()
}

/// Map a raw gender value onto `Male`/`Female`, or `None` when unmapped.
///
/// Spellings outside the lookup table, such as `"mAlE"`, are unmapped.
pub(crate) fn standardize_gender(value: &str) -> Option<&'static str> {
    let token = value.trim();
    GENDER_LOOKUP
        .iter()
        .find(|(raw, _)| *raw == token)
        .map(|(_, label)| *label)
}
