//! Centralized name parsing for step directories and page slugs.
//!
//! Two naming rules live here so the loader and the catalog agree on them:
//!
//! ## Step Directories
//!
//! Every example directory holds numbered steps: `1/`, `2/`, `10/`. The name
//! is a plain decimal integer and steps are ordered by its numeric value, so
//! `10` sorts after `2`. Leading zeros are accepted (`01` is step 1).
//!
//! ## Slugs
//!
//! A slug names the output page (`<slug>.html`) and appears unencoded in URLs,
//! so it is limited to ASCII letters, digits, `-`, `_` and `.`, must not be
//! hidden, and must not be `index` (the site root owns `index.html`).

/// Parse a step directory name into its step number.
///
/// - `"1"` → `Some(1)`
/// - `"010"` → `Some(10)`
/// - `"2-intro"` → `None` (labels are not part of the convention)
/// - `"+3"`, `" 3"`, `""` → `None`
pub fn parse_step_number(name: &str) -> Option<u32> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Why a slug cannot be used as an output page name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugProblem {
    Empty,
    PathSeparator,
    Hidden,
    /// A character that would need escaping in a URL or file name.
    InvalidChar(char),
    /// The name of a page the site generates itself.
    Reserved,
}

/// Page names owned by the site itself.
const RESERVED_SLUGS: &[&str] = &["index"];

impl std::fmt::Display for SlugProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlugProblem::Empty => write!(f, "slug is empty"),
            SlugProblem::PathSeparator => write!(f, "slug contains a path separator"),
            SlugProblem::Hidden => write!(f, "slug starts with '.'"),
            SlugProblem::InvalidChar(c) => write!(
                f,
                "slug contains {c:?}; use ASCII letters, digits, '-', '_' or '.'"
            ),
            SlugProblem::Reserved => write!(f, "slug is reserved for a generated page"),
        }
    }
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Check that a slug is usable verbatim as a file name and a URL path.
///
/// Reserved names are compared case-insensitively so `Index` cannot replace
/// `index.html` on case-insensitive filesystems.
pub fn check_slug(slug: &str) -> Result<(), SlugProblem> {
    if slug.trim().is_empty() {
        return Err(SlugProblem::Empty);
    }
    if slug.contains('/') || slug.contains('\\') {
        return Err(SlugProblem::PathSeparator);
    }
    if let Some(c) = slug.chars().find(|&c| !is_slug_char(c)) {
        return Err(SlugProblem::InvalidChar(c));
    }
    if slug.starts_with('.') {
        return Err(SlugProblem::Hidden);
    }
    if RESERVED_SLUGS.iter().any(|r| r.eq_ignore_ascii_case(slug)) {
        return Err(SlugProblem::Reserved);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_number() {
        assert_eq!(parse_step_number("1"), Some(1));
        assert_eq!(parse_step_number("10"), Some(10));
    }

    #[test]
    fn leading_zeros() {
        assert_eq!(parse_step_number("007"), Some(7));
        assert_eq!(parse_step_number("000"), Some(0));
    }

    #[test]
    fn labelled_name_rejected() {
        assert_eq!(parse_step_number("2-intro"), None);
    }

    #[test]
    fn signs_and_whitespace_rejected() {
        assert_eq!(parse_step_number("+3"), None);
        assert_eq!(parse_step_number(" 3"), None);
        assert_eq!(parse_step_number(""), None);
    }

    #[test]
    fn overflow_rejected() {
        assert_eq!(parse_step_number("99999999999999999999"), None);
    }

    #[test]
    fn numeric_not_lexicographic() {
        let mut names = vec!["2", "10", "1"];
        names.sort_by_key(|n| parse_step_number(n));
        assert_eq!(names, vec!["1", "2", "10"]);
    }

    #[test]
    fn valid_slugs() {
        assert_eq!(check_slug("hello-world"), Ok(()));
        assert_eq!(check_slug("http.server"), Ok(()));
    }

    #[test]
    fn invalid_slugs() {
        assert_eq!(check_slug(""), Err(SlugProblem::Empty));
        assert_eq!(check_slug("   "), Err(SlugProblem::Empty));
        assert_eq!(check_slug("a/b"), Err(SlugProblem::PathSeparator));
        assert_eq!(check_slug("a\\b"), Err(SlugProblem::PathSeparator));
        assert_eq!(check_slug(".secret"), Err(SlugProblem::Hidden));
    }

    #[test]
    fn url_unsafe_characters_rejected() {
        assert_eq!(check_slug("a#b"), Err(SlugProblem::InvalidChar('#')));
        assert_eq!(check_slug("a?b"), Err(SlugProblem::InvalidChar('?')));
        assert_eq!(check_slug("100%"), Err(SlugProblem::InvalidChar('%')));
        assert_eq!(check_slug("two words"), Err(SlugProblem::InvalidChar(' ')));
        assert_eq!(check_slug("café"), Err(SlugProblem::InvalidChar('é')));
    }

    #[test]
    fn index_is_reserved_in_any_case() {
        assert_eq!(check_slug("index"), Err(SlugProblem::Reserved));
        assert_eq!(check_slug("Index"), Err(SlugProblem::Reserved));
        assert_eq!(check_slug("INDEX"), Err(SlugProblem::Reserved));
        assert_eq!(check_slug("index-of-things"), Ok(()));
    }
}
