use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SlugError;

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\d]+").expect("invalid slug pattern"));

/// Normalizes `s` into a URL-safe slug: lowercased, runs of anything
/// outside `[a-z0-9]` collapsed into single hyphens, hyphens trimmed.
pub fn slugify(s: &str) -> Result<String, SlugError> {
    if s.is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let slug = NON_SLUG
        .replace_all(&s.to_lowercase(), "-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() {
        return Err(SlugError::EmptyOutput);
    }

    Ok(slug)
}
