//! Output escaping for HTML text, attributes and URLs.

const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https"];

/// Escapes text content.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escapes a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    escape_html(value)
}

/// Sanitizes a URL for an `href` attribute.
///
/// Whitespace and control characters are dropped; absolute URLs with a
/// scheme other than http(s) become empty.
pub fn escape_url(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|ch| !ch.is_control() && !ch.is_whitespace())
        .collect();

    if let Some((scheme, _)) = cleaned.split_once(':') {
        let looks_like_scheme = !scheme.is_empty()
            && scheme
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'));
        if looks_like_scheme
            && !ALLOWED_URL_SCHEMES
                .iter()
                .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
        {
            return String::new();
        }
    }

    escape_attr(&cleaned)
}
