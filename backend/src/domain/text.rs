//! Free-text normalisation applied before names reach storage.
//!
//! Titles, names, usernames and emails are stored trimmed, lowercased and
//! with internal whitespace collapsed so uniqueness checks are
//! case-insensitive.

/// Normalise free text, returning `None` when nothing meaningful remains.
///
/// # Examples
/// ```
/// use bookshelf::domain::text::normalize;
///
/// assert_eq!(normalize("  The   Left Hand of\tDarkness "), Some("the left hand of darkness".to_owned()));
/// assert_eq!(normalize("   "), None);
/// ```
#[must_use]
pub fn normalize(input: &str) -> Option<String> {
    let collapsed = input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Normalise an optional value, treating blank input as absent.
#[must_use]
pub fn normalize_opt(input: Option<&str>) -> Option<String> {
    input.and_then(normalize)
}

/// Normalise each entry, dropping blanks and duplicates while keeping order.
#[must_use]
pub fn normalize_all<'a>(inputs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in inputs.into_iter().filter_map(normalize) {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Trim a value, returning `None` when blank. Case is preserved.
#[must_use]
pub fn trimmed(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
