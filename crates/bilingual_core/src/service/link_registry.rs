//! Bidirectional translation link maintenance.
//!
//! # Responsibility
//! - Read and write the translation link attribute of content records.
//! - Repair reverse edges whenever a record is repointed or cleared.
//!
//! # Invariants
//! - Symmetry: `link(a) == Some(b)` implies `link(b) == Some(a)`.
//! - A record has at most one partner, and never itself.
//! - Two stored records of the same category are never linked.
//! - Every `set_link` runs inside one `ContentStore::atomically` unit.

use crate::model::record::{Category, ContentRecord, RecordId};
use crate::repo::record_repo::{ContentStore, RepoError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Metadata key holding a record's translation partner.
pub const TRANSLATION_META_KEY: &str = "_bl_translation_id";

pub type LinkResult<T> = Result<T, LinkError>;

#[derive(Debug)]
pub enum LinkError {
    /// A record cannot be its own translation.
    SelfLink(RecordId),
    /// Both records exist and share one category.
    SameLanguage {
        record: RecordId,
        partner: RecordId,
        category: Category,
    },
    /// Stored link value is not a record identifier.
    InvalidLinkValue { record: RecordId, value: String },
    Repo(RepoError),
}

impl Display for LinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfLink(id) => write!(f, "record cannot be linked to itself: {id}"),
            Self::SameLanguage {
                record,
                partner,
                category,
            } => write!(
                f,
                "records {record} and {partner} are both {} and cannot be linked",
                category.as_str()
            ),
            Self::InvalidLinkValue { record, value } => {
                write!(f, "record {record} has invalid translation link `{value}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LinkError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Summary of one `set_link` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChange {
    pub record: RecordId,
    /// Partner before the call.
    pub previous: Option<RecordId>,
    /// Partner after the call.
    pub current: Option<RecordId>,
    /// Records whose stale reverse link was cleared.
    pub unlinked: Vec<RecordId>,
}

impl LinkChange {
    pub fn is_noop(&self) -> bool {
        self.previous == self.current && self.unlinked.is_empty()
    }
}

/// Owner of the translation link symmetry invariant.
pub struct LinkRegistry<S: ContentStore> {
    store: S,
}

impl<S: ContentStore> LinkRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store, for callers that also render records.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the linked partner ID, dangling or not.
    pub fn get_link(&self, id: RecordId) -> LinkResult<Option<RecordId>> {
        let Some(value) = self.store.get_meta(id, TRANSLATION_META_KEY)? else {
            return Ok(None);
        };
        Uuid::parse_str(value.trim())
            .map(Some)
            .map_err(|_| LinkError::InvalidLinkValue { record: id, value })
    }

    /// Returns the linked partner record; a dangling link yields `None`.
    pub fn resolve_link(&self, id: RecordId) -> LinkResult<Option<ContentRecord>> {
        match self.get_link(id)? {
            Some(partner) => Ok(self.store.get_record(partner)?),
            None => Ok(None),
        }
    }

    /// Points `id` at `new_partner` (or clears it) and repairs reverse links.
    ///
    /// # Contract
    /// - The old partner is unlinked when it still points back at `id`.
    /// - A new partner previously linked elsewhere has that other record
    ///   unlinked too, so no one-directional edge survives.
    /// - A partner missing from the store is still linked (dangling).
    /// - Repeating the call with the same arguments changes nothing.
    ///
    /// # Errors
    /// - `SelfLink` / `SameLanguage` are returned before any write.
    /// - Store failures roll back every write of this call.
    pub fn set_link(&self, id: RecordId, new_partner: Option<RecordId>) -> LinkResult<LinkChange> {
        if new_partner == Some(id) {
            return Err(LinkError::SelfLink(id));
        }

        let change = self.store.atomically(|| self.relink(id, new_partner))?;

        if change.is_noop() {
            debug!("event=link_set module=link_registry status=noop record={id}");
        } else {
            info!(
                "event=link_set module=link_registry status=ok record={} previous={} current={} unlinked={}",
                id,
                fmt_link(change.previous),
                fmt_link(change.current),
                change.unlinked.len()
            );
        }
        Ok(change)
    }

    fn relink(&self, id: RecordId, new_partner: Option<RecordId>) -> LinkResult<LinkChange> {
        if let Some(partner) = new_partner {
            self.ensure_opposite_languages(id, partner)?;
        }

        let previous = self.stored_link(id)?;
        let mut unlinked = Vec::new();

        if let Some(old) = previous.filter(|old| Some(*old) != new_partner) {
            if self.clear_if_points_at(old, id)? {
                unlinked.push(old);
            }
        }

        match new_partner {
            Some(partner) => {
                if let Some(displaced) = self.stored_link(partner)?.filter(|other| *other != id) {
                    if self.clear_if_points_at(displaced, partner)? {
                        unlinked.push(displaced);
                    }
                }
                self.store
                    .set_meta(id, TRANSLATION_META_KEY, &partner.to_string())?;
                self.store
                    .set_meta(partner, TRANSLATION_META_KEY, &id.to_string())?;
            }
            None => self.store.delete_meta(id, TRANSLATION_META_KEY)?,
        }

        Ok(LinkChange {
            record: id,
            previous,
            current: new_partner,
            unlinked,
        })
    }

    /// Like `get_link`, but an unparsable stored value reads as absent and
    /// is logged at warn. Used where a corrupt link must not block editing.
    pub fn stored_link(&self, id: RecordId) -> LinkResult<Option<RecordId>> {
        match self.get_link(id) {
            Err(LinkError::InvalidLinkValue { value, .. }) => {
                warn!(
                    "event=link_read module=link_registry status=invalid record={id} value_len={}",
                    value.len()
                );
                Ok(None)
            }
            other => other,
        }
    }

    /// Clears `record`'s link only when it targets `target`.
    fn clear_if_points_at(&self, record: RecordId, target: RecordId) -> LinkResult<bool> {
        // An unparsable stale value is cleared too; it cannot be symmetric.
        let points_back = match self.get_link(record) {
            Ok(link) => link == Some(target),
            Err(LinkError::InvalidLinkValue { .. }) => true,
            Err(err) => return Err(err),
        };
        if points_back {
            self.store.delete_meta(record, TRANSLATION_META_KEY)?;
        }
        Ok(points_back)
    }

    fn ensure_opposite_languages(&self, id: RecordId, partner: RecordId) -> LinkResult<()> {
        let (Some(record), Some(other)) =
            (self.store.get_record(id)?, self.store.get_record(partner)?)
        else {
            return Ok(());
        };
        if record.category == other.category {
            return Err(LinkError::SameLanguage {
                record: id,
                partner,
                category: record.category,
            });
        }
        Ok(())
    }
}

fn fmt_link(link: Option<RecordId>) -> String {
    link.map_or_else(|| "none".to_string(), |id| id.to_string())
}
