//! Host adapter for the bilingual site.
//!
//! # Responsibility
//! - Translate host lifecycle points into explicit calls: category
//!   registration, edit panel, record save, `lang` filter, head injection
//!   and template selection.
//! - Absorb every failure: host-facing methods never fail a request.
//!
//! # Invariants
//! - Link writes only happen through `LinkRegistry::set_link`, and only after
//!   `authorize_save` passes.
//! - Head links are emitted only for a managed record whose partner exists.
//! - `x-default` always targets the primary-language record of the pair.

use crate::config::SiteConfig;
use crate::model::record::{Category, ContentRecord, RecordId};
use crate::render::head::{lang_attribute, render_alternate_links, AlternateLink, X_DEFAULT};
use crate::render::panel::{PanelOption, TranslationPanel};
use crate::repo::record_repo::ContentStore;
use crate::service::category::CategoryRegistration;
use crate::service::link_registry::{LinkChange, LinkError, LinkRegistry, LinkResult};
use crate::service::permalink::permalink;
use crate::service::save_guard::{
    authorize_save, EditPermission, NonceVerifier, SaveRequest, SkipReason,
    TRANSLATION_NONCE_ACTION,
};
use crate::service::template::{select_template, TemplateLocator, PAGE_TEMPLATE_META_KEY};
use log::{debug, error, info, warn};
use std::path::PathBuf;

/// What the front-end host is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageView {
    /// A single record, by ID.
    Record(RecordId),
    /// Archives, search results, anything that is not one record.
    Other,
}

/// Result of handling one record save.
#[derive(Debug)]
pub enum SaveOutcome {
    /// Preconditions failed; nothing was written.
    Skipped(SkipReason),
    /// Links were written (possibly a no-op rewrite).
    Linked(LinkChange),
    /// The link change was refused or the store failed; nothing was written.
    Failed(LinkError),
}

/// Bilingual pages behaviour bound to one configuration and store.
pub struct BilingualSite<S: ContentStore> {
    config: SiteConfig,
    links: LinkRegistry<S>,
}

impl<S: ContentStore> BilingualSite<S> {
    pub fn new(config: SiteConfig, store: S) -> Self {
        for setting in config.malformed_settings() {
            warn!("event=config_check module=site status=degraded setting={setting}");
        }
        Self {
            config,
            links: LinkRegistry::new(store),
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn links(&self) -> &LinkRegistry<S> {
        &self.links
    }

    fn store(&self) -> &S {
        self.links.store()
    }

    /// Registration descriptor of the secondary category.
    pub fn secondary_category(&self) -> CategoryRegistration {
        CategoryRegistration::secondary(&self.config)
    }

    /// Public URL of `record`.
    pub fn permalink(&self, record: &ContentRecord) -> String {
        permalink(&self.config, record)
    }

    /// Builds the edit panel for `id`; `None` when the record is unknown.
    ///
    /// A corrupt stored link shows as "no selection" so the editor can
    /// overwrite it.
    pub fn translation_panel(
        &self,
        id: RecordId,
        nonces: &impl NonceVerifier,
    ) -> LinkResult<Option<TranslationPanel>> {
        let Some(record) = self.store().get_record(id)? else {
            return Ok(None);
        };
        let linked = self.links.stored_link(id)?;
        let opposite = record.category.opposite();

        let options = self
            .store()
            .list_records(opposite)?
            .into_iter()
            .map(|candidate| PanelOption {
                selected: Some(candidate.id) == linked,
                id: candidate.id,
                title: candidate.title,
            })
            .collect();

        Ok(Some(TranslationPanel {
            current_language: self.config.display_name_of(record.category),
            opposite_language: self.config.display_name_of(opposite),
            options,
            nonce: nonces.issue(TRANSLATION_NONCE_ACTION),
        }))
    }

    /// Handles a record save submitted from the edit screen.
    pub fn handle_save(
        &self,
        request: &SaveRequest,
        nonces: &impl NonceVerifier,
        permission: &impl EditPermission,
    ) -> SaveOutcome {
        let id = request.record_id;
        let managed = match self.store().get_record(id) {
            Ok(record) => record.is_some(),
            Err(err) => {
                error!("event=record_save module=site status=error record={id} error={err}");
                return SaveOutcome::Failed(err.into());
            }
        };

        let check = if managed {
            authorize_save(request, nonces, permission)
        } else {
            Err(SkipReason::UnmanagedRecord)
        };
        if let Err(reason) = check {
            info!("event=record_save module=site status=skipped record={id} reason={reason}");
            return SaveOutcome::Skipped(reason);
        }

        match self.links.set_link(id, request.selected_partner()) {
            Ok(change) => SaveOutcome::Linked(change),
            Err(err) => {
                error!("event=record_save module=site status=error record={id} error={err}");
                SaveOutcome::Failed(err)
            }
        }
    }

    /// `lang` attribute for the root element; other views keep `host_default`.
    pub fn language_attribute(&self, view: PageView, host_default: &str) -> String {
        match self.viewed_record(view) {
            Some(record) => lang_attribute(&self.config.language_of(record.category)),
            None => host_default.to_string(),
        }
    }

    /// hreflang alternates for `view`, current language first.
    pub fn head_links(&self, view: PageView) -> LinkResult<Vec<AlternateLink>> {
        let PageView::Record(id) = view else {
            return Ok(Vec::new());
        };
        let Some(current) = self.store().get_record(id)? else {
            return Ok(Vec::new());
        };
        let Some(partner) = self.links.resolve_link(id)? else {
            return Ok(Vec::new());
        };

        let current_url = self.permalink(&current);
        let partner_url = self.permalink(&partner);
        let default_url = match current.category {
            Category::Primary => current_url.clone(),
            Category::Secondary => partner_url.clone(),
        };

        Ok(vec![
            AlternateLink::new(self.config.language_of(current.category), current_url),
            AlternateLink::new(self.config.language_of(partner.category), partner_url),
            AlternateLink::new(X_DEFAULT, default_url),
        ])
    }

    /// Markup injected into the document head; empty when nothing applies.
    pub fn head_markup(&self, view: PageView) -> String {
        match self.head_links(view) {
            Ok(links) => render_alternate_links(&links),
            Err(err) => {
                error!("event=head_links module=site status=error error={err}");
                String::new()
            }
        }
    }

    /// Template for `view`: a secondary record's stored page template when
    /// the theme has it, `host_template` otherwise.
    pub fn template_for(
        &self,
        view: PageView,
        host_template: PathBuf,
        locator: &impl TemplateLocator,
    ) -> PathBuf {
        let Some(record) = self.viewed_record(view) else {
            return host_template;
        };
        if record.category != Category::Secondary {
            return host_template;
        }

        match self.store().get_meta(record.id, PAGE_TEMPLATE_META_KEY) {
            Ok(stored) => select_template(stored.as_deref(), host_template, locator),
            Err(err) => {
                error!(
                    "event=template_select module=site status=error record={} error={err}",
                    record.id
                );
                host_template
            }
        }
    }

    fn viewed_record(&self, view: PageView) -> Option<ContentRecord> {
        let PageView::Record(id) = view else {
            return None;
        };
        match self.store().get_record(id) {
            Ok(record) => {
                if record.is_none() {
                    debug!("event=view_lookup module=site status=unmanaged record={id}");
                }
                record
            }
            Err(err) => {
                error!("event=view_lookup module=site status=error record={id} error={err}");
                None
            }
        }
    }
}
