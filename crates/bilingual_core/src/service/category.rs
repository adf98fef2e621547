//! Secondary category registration descriptor.
//!
//! The host registers the second-language content type from this value; it
//! is serializable so adapters can hand it over as JSON.

use crate::config::SiteConfig;
use crate::model::record::Category;
use serde::Serialize;

/// Menu slot of the secondary category, right below the host's pages.
pub const SECONDARY_MENU_POSITION: u32 = 21;

const SUPPORTED_FEATURES: &[&str] = &[
    "title",
    "editor",
    "author",
    "thumbnail",
    "excerpt",
    "page-attributes",
    "custom-fields",
    "revisions",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLabels {
    pub name: String,
    pub singular_name: String,
    pub add_new: String,
    pub add_new_item: String,
    pub edit_item: String,
    pub new_item: String,
    pub view_item: String,
    pub search_items: String,
    pub not_found: String,
    pub not_found_in_trash: String,
    pub parent_item_colon: String,
    pub all_items: String,
    pub menu_name: String,
}

impl CategoryLabels {
    fn for_language(name: &str) -> Self {
        Self {
            name: format!("Pages {name}"),
            singular_name: format!("Page {name}"),
            add_new: "Add New".to_string(),
            add_new_item: format!("Add New Page {name}"),
            edit_item: format!("Edit Page {name}"),
            new_item: format!("New Page {name}"),
            view_item: format!("View Page {name}"),
            search_items: format!("Search Pages {name}"),
            not_found: "No pages found".to_string(),
            not_found_in_trash: "No pages found in Trash".to_string(),
            parent_item_colon: "Parent Page:".to_string(),
            all_items: format!("All Pages {name}"),
            menu_name: format!("Pages {name}"),
        }
    }
}

/// Routing rule of the secondary category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteRule {
    pub slug: String,
    /// Whether the host's global permalink front is prepended.
    pub with_front: bool,
}

/// Everything the host needs to register the secondary category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRegistration {
    pub key: String,
    pub labels: CategoryLabels,
    pub public: bool,
    pub publicly_queryable: bool,
    pub show_ui: bool,
    pub show_in_menu: bool,
    pub show_in_rest: bool,
    pub query_var: bool,
    pub has_archive: bool,
    pub hierarchical: bool,
    pub rewrite: RewriteRule,
    /// Permission model shared with the host's default pages.
    pub capability_type: String,
    pub menu_position: u32,
    pub menu_icon: String,
    pub supports: Vec<String>,
}

impl CategoryRegistration {
    pub fn secondary(config: &SiteConfig) -> Self {
        let name = config.display_name_of(Category::Secondary);
        Self {
            key: config.secondary_category_key(),
            labels: CategoryLabels::for_language(&name),
            public: true,
            publicly_queryable: true,
            show_ui: true,
            show_in_menu: true,
            show_in_rest: true,
            query_var: true,
            has_archive: false,
            hierarchical: true,
            rewrite: RewriteRule {
                slug: config.secondary_slug(),
                with_front: false,
            },
            capability_type: "page".to_string(),
            menu_position: SECONDARY_MENU_POSITION,
            menu_icon: "dashicons-admin-page".to_string(),
            supports: SUPPORTED_FEATURES
                .iter()
                .map(|feature| feature.to_string())
                .collect(),
        }
    }
}
