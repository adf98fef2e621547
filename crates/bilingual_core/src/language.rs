//! Language tag helpers.
//!
//! Deterministic string transforms over `language[-_]REGION` tags. Malformed
//! input degrades to odd-looking output instead of failing; empty input
//! yields empty output.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(?:[-_](?:[A-Za-z]{2}|[0-9]{3}))?$").expect("valid tag regex")
});

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or_default()
}

/// Lowercase primary subtag, e.g. `en-GB` -> `en`.
pub fn short_code(tag: &str) -> String {
    primary_subtag(tag).to_lowercase()
}

/// Uppercase primary subtag used in labels, e.g. `en-GB` -> `EN`.
pub fn display_name(tag: &str) -> String {
    primary_subtag(tag).to_uppercase()
}

/// Converts host locale form to hreflang form, e.g. `pl_PL` -> `pl-PL`.
pub fn to_hreflang_format(tag: &str) -> String {
    tag.replace('_', "-")
}

/// Whether `tag` looks like `ll`, `ll-RR` or `ll_RR`.
pub fn is_well_formed_tag(tag: &str) -> bool {
    TAG_RE.is_match(tag)
}
