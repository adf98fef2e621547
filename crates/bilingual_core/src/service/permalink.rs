//! Public URL construction for managed records.

use crate::config::SiteConfig;
use crate::model::record::{Category, ContentRecord};

/// Builds the public URL of `record`.
///
/// Primary records live at `{base}/{slug}/`, secondary records under the
/// secondary category slug at `{base}/{short}/{slug}/`. An empty category
/// slug (malformed configuration) collapses to the primary shape.
pub fn permalink(config: &SiteConfig, record: &ContentRecord) -> String {
    let prefix = match record.category {
        Category::Primary => String::new(),
        Category::Secondary => config.secondary_slug(),
    };

    let mut url = config.base_url.clone();
    for segment in [prefix.as_str(), record.slug.as_str()] {
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment);
    }
    url.push('/');
    url
}
