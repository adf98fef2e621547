//! `lang` attribute and hreflang alternate links.

use super::escape::{escape_attr, escape_url};

/// hreflang value of the fallback variant.
pub const X_DEFAULT: &str = "x-default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateLink {
    pub hreflang: String,
    pub href: String,
}

impl AlternateLink {
    pub fn new(hreflang: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            hreflang: hreflang.into(),
            href: href.into(),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            r#"<link rel="alternate" hreflang="{}" href="{}" />"#,
            escape_attr(&self.hreflang),
            escape_url(&self.href)
        )
    }
}

/// One `<link>` per line, each newline-terminated; empty for no links.
pub fn render_alternate_links(links: &[AlternateLink]) -> String {
    links
        .iter()
        .map(|link| format!("{}\n", link.to_html()))
        .collect()
}

/// Root element attribute, e.g. `lang="pl-PL"`.
pub fn lang_attribute(language: &str) -> String {
    format!(r#"lang="{}""#, escape_attr(language))
}
