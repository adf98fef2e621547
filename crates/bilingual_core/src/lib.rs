//! Bilingual pages: translation links between a page and its counterpart in
//! a second configured language, plus the language/hreflang metadata a host
//! renders for them.
//!
//! The link symmetry rule lives in `service::link_registry`; everything a
//! content-management host calls into goes through `service::site`.

pub mod config;
pub mod db;
pub mod language;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{ConfigError, SiteConfig};
pub use language::{display_name, is_well_formed_tag, short_code, to_hreflang_format};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{Category, ContentRecord, RecordId, RecordValidationError};
pub use render::head::AlternateLink;
pub use render::panel::{PanelOption, TranslationPanel};
pub use repo::memory_repo::MemoryContentStore;
pub use repo::record_repo::{ContentStore, RepoError, RepoResult, SqliteContentStore};
pub use service::category::CategoryRegistration;
pub use service::link_registry::{
    LinkChange, LinkError, LinkRegistry, LinkResult, TRANSLATION_META_KEY,
};
pub use service::save_guard::{
    EditPermission, EditScope, NonceVerifier, Principal, SaveRequest, SessionNonces, SkipReason,
};
pub use service::site::{BilingualSite, PageView, SaveOutcome};
pub use service::template::{TemplateLocator, TemplateTable, PAGE_TEMPLATE_META_KEY};

/// Minimal health-check API for host integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
