//! Page template selection for secondary records.
//!
//! Secondary records reuse the theme's page templates: a record naming a
//! non-default template that the theme can locate renders with it.

use std::collections::HashMap;
use std::path::PathBuf;

/// Metadata key holding a record's chosen page template file.
pub const PAGE_TEMPLATE_META_KEY: &str = "_page_template";
/// Template value meaning "use whatever the host picks".
pub const DEFAULT_TEMPLATE: &str = "default";

/// Theme template lookup supplied by the front-end host.
pub trait TemplateLocator {
    fn locate(&self, template: &str) -> Option<PathBuf>;
}

/// Fixed name -> path table, for hosts that preload their theme index.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    entries: HashMap<String, PathBuf>,
}

impl TemplateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, template: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(template.into(), path.into());
        self
    }
}

impl TemplateLocator for TemplateTable {
    fn locate(&self, template: &str) -> Option<PathBuf> {
        self.entries.get(template).cloned()
    }
}

/// Picks the stored template when it is set, not `default`, and locatable.
pub fn select_template(
    stored: Option<&str>,
    host_template: PathBuf,
    locator: &impl TemplateLocator,
) -> PathBuf {
    stored
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != DEFAULT_TEMPLATE)
        .and_then(|name| locator.locate(name))
        .unwrap_or(host_template)
}
