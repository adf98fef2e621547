//! Deployment configuration for the bilingual site.
//!
//! # Invariants
//! - Configuration is an explicit value handed to `BilingualSite::new`;
//!   nothing here is process-global.
//! - Malformed language tags are tolerated and reported, never rejected.
//! - `base_url` never ends with `/`.

use crate::language::{display_name, is_well_formed_tag, short_code, to_hreflang_format};
use crate::model::record::Category;
use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Host locale used when `BILINGUAL_FIRST_LOCALE` is unset.
pub const DEFAULT_FIRST_LOCALE: &str = "pl_PL";
/// Second language used when `BILINGUAL_SECOND_LANG` is unset.
pub const DEFAULT_SECOND_LANGUAGE: &str = "en-GB";

pub const FIRST_LOCALE_ENV: &str = "BILINGUAL_FIRST_LOCALE";
pub const SECOND_LANGUAGE_ENV: &str = "BILINGUAL_SECOND_LANG";
pub const BASE_URL_ENV: &str = "BILINGUAL_BASE_URL";

const SECONDARY_CATEGORY_PREFIX: &str = "bl_";
const BASE_URL_SCHEMES: &[&str] = &["http://", "https://"];

/// Errors while loading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NotUnicode(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotUnicode(name) => write!(f, "environment variable {name} is not valid unicode"),
        }
    }
}

impl Error for ConfigError {}

/// Site-wide language configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Host locale of primary records, usually in `ll_RR` form.
    pub first_locale: String,
    /// Language of secondary records, in `ll[-RR]` form. Changing it does not
    /// migrate existing secondary records.
    pub second_language: String,
    /// Public URL prefix, empty for root-relative permalinks.
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_LOCALE, DEFAULT_SECOND_LANGUAGE)
    }
}

impl SiteConfig {
    pub fn new(first_locale: impl Into<String>, second_language: impl Into<String>) -> Self {
        Self {
            first_locale: first_locale.into(),
            second_language: second_language.into(),
            base_url: String::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Loads configuration from `BILINGUAL_*` environment variables, falling
    /// back to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(()),
        })
    }

    fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<Option<String>, ()>,
    ) -> Result<Self, ConfigError> {
        let read = |name: &'static str, default: &str| -> Result<String, ConfigError> {
            let value = lookup(name).map_err(|()| ConfigError::NotUnicode(name))?;
            Ok(value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string()))
        };

        let config = Self::new(
            read(FIRST_LOCALE_ENV, DEFAULT_FIRST_LOCALE)?,
            read(SECOND_LANGUAGE_ENV, DEFAULT_SECOND_LANGUAGE)?,
        );
        Ok(config.with_base_url(read(BASE_URL_ENV, "")?))
    }

    /// hreflang/`lang` value for records of `category`.
    pub fn language_of(&self, category: Category) -> String {
        match category {
            Category::Primary => to_hreflang_format(&self.first_locale),
            Category::Secondary => to_hreflang_format(&self.second_language),
        }
    }

    /// Uppercase label for records of `category`, e.g. `PL`.
    pub fn display_name_of(&self, category: Category) -> String {
        match category {
            Category::Primary => display_name(&self.first_locale),
            Category::Secondary => display_name(&self.second_language),
        }
    }

    /// Routing slug of the secondary category, e.g. `en`.
    pub fn secondary_slug(&self) -> String {
        short_code(&self.second_language)
    }

    /// Host key under which the secondary category is registered.
    pub fn secondary_category_key(&self) -> String {
        format!("{SECONDARY_CATEGORY_PREFIX}{}", self.secondary_slug())
    }

    /// Names of settings holding malformed language tags or a base URL that
    /// would render as an unusable `href`.
    pub fn malformed_settings(&self) -> Vec<&'static str> {
        let mut malformed = Vec::new();
        if !is_well_formed_tag(&self.first_locale) {
            malformed.push("first_locale");
        }
        if !is_well_formed_tag(&self.second_language) {
            malformed.push("second_language");
        }
        if !is_usable_base_url(&self.base_url) {
            malformed.push("base_url");
        }
        malformed
    }
}

/// Empty, a root path prefix, or an absolute http(s) URL. Anything else
/// (`localhost:8080`, `example.org`) is dropped or misread by href escaping.
fn is_usable_base_url(base_url: &str) -> bool {
    if base_url.is_empty() || base_url.starts_with('/') {
        return true;
    }
    let lowered = base_url.to_ascii_lowercase();
    BASE_URL_SCHEMES
        .iter()
        .any(|scheme| lowered.len() > scheme.len() && lowered.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::{SiteConfig, BASE_URL_ENV, SECOND_LANGUAGE_ENV};
    use crate::config::ConfigError;
    use crate::model::record::Category;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = SiteConfig::from_lookup(|_| Ok(None)).unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.base_url, "");
    }

    #[test]
    fn lookup_values_override_defaults() {
        let config = SiteConfig::from_lookup(|name| {
            Ok(match name {
                SECOND_LANGUAGE_ENV => Some(" de-DE ".to_string()),
                BASE_URL_ENV => Some("https://example.org/".to_string()),
                _ => None,
            })
        })
        .unwrap();
        assert_eq!(config.second_language, "de-DE");
        assert_eq!(config.base_url, "https://example.org");
        assert_eq!(config.secondary_category_key(), "bl_de");
    }

    #[test]
    fn non_unicode_values_are_reported_by_name() {
        let err = SiteConfig::from_lookup(|name| {
            if name == SECOND_LANGUAGE_ENV {
                Err(())
            } else {
                Ok(None)
            }
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::NotUnicode(SECOND_LANGUAGE_ENV));
    }

    #[test]
    fn languages_are_reported_in_hreflang_form() {
        let config = SiteConfig::new("pl_PL", "en-GB");
        assert_eq!(config.language_of(Category::Primary), "pl-PL");
        assert_eq!(config.language_of(Category::Secondary), "en-GB");
        assert_eq!(config.display_name_of(Category::Primary), "PL");
        assert_eq!(config.display_name_of(Category::Secondary), "EN");
        assert_eq!(config.secondary_slug(), "en");
    }

    #[test]
    fn malformed_tags_are_listed_not_rejected() {
        let config = SiteConfig::new("pl_PL", "-GB");
        assert_eq!(config.malformed_settings(), vec!["second_language"]);
        assert_eq!(config.secondary_slug(), "");
        assert!(SiteConfig::default().malformed_settings().is_empty());
    }

    #[test]
    fn base_url_without_scheme_is_reported() {
        for base_url in ["localhost:8080", "example.org/site", "https://"] {
            let config = SiteConfig::default().with_base_url(base_url);
            assert_eq!(config.malformed_settings(), vec!["base_url"], "{base_url}");
        }
        for base_url in ["", "/blog", "HTTPS://example.org", "http://localhost:8080/"] {
            let config = SiteConfig::default().with_base_url(base_url);
            assert!(config.malformed_settings().is_empty(), "{base_url}");
        }
    }
}
