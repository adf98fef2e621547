//! Authorization gate in front of translation link writes.
//!
//! # Invariants
//! - A save passes only with a valid token for `TRANSLATION_NONCE_ACTION`,
//!   outside autosave, and when the principal may edit the record.
//! - Checks run in that order; the first failure decides the skip reason.
//! - Tokens are compared in constant time.

use crate::model::record::RecordId;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt::{Display, Formatter};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Action scope of the edit panel's anti-forgery token.
pub const TRANSLATION_NONCE_ACTION: &str = "bl_translation";
/// Form field carrying the anti-forgery token.
pub const TRANSLATION_NONCE_FIELD: &str = "bl_translation_nonce";
/// Form field carrying the selected translation ID.
pub const TRANSLATION_FIELD: &str = "bl_translation_id";

/// Anti-forgery token mechanism supplied by the edit UI host.
pub trait NonceVerifier {
    /// Issues a token for `action` to embed in a rendered form.
    fn issue(&self, action: &str) -> String;
    /// Checks a submitted token against `action`.
    fn verify(&self, action: &str, token: &str) -> bool;
}

/// Per-session token store: one random token per action.
#[derive(Debug, Default)]
pub struct SessionNonces {
    tokens: RefCell<BTreeMap<String, String>>,
}

impl SessionNonces {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NonceVerifier for SessionNonces {
    fn issue(&self, action: &str) -> String {
        self.tokens
            .borrow_mut()
            .entry(action.to_string())
            .or_insert_with(|| Uuid::new_v4().simple().to_string())
            .clone()
    }

    fn verify(&self, action: &str, token: &str) -> bool {
        let tokens = self.tokens.borrow();
        let Some(expected) = tokens.get(action) else {
            return false;
        };
        constant_time_eq(expected, token)
    }
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.as_bytes().ct_eq(right.as_bytes()).into()
}

/// Edit permission check supplied by the host.
pub trait EditPermission {
    fn can_edit(&self, record: RecordId) -> bool;
}

/// Which records a principal may edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditScope {
    All,
    Records(HashSet<RecordId>),
    Nothing,
}

/// Acting user of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub scope: EditScope,
}

impl Principal {
    pub fn editor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: EditScope::All,
        }
    }

    pub fn viewer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: EditScope::Nothing,
        }
    }

    pub fn owner_of(name: impl Into<String>, records: impl IntoIterator<Item = RecordId>) -> Self {
        Self {
            name: name.into(),
            scope: EditScope::Records(records.into_iter().collect()),
        }
    }
}

impl EditPermission for Principal {
    fn can_edit(&self, record: RecordId) -> bool {
        match &self.scope {
            EditScope::All => true,
            EditScope::Records(records) => records.contains(&record),
            EditScope::Nothing => false,
        }
    }
}

/// Submitted edit form for one record save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveRequest {
    pub record_id: RecordId,
    /// Value of `TRANSLATION_NONCE_FIELD`, if submitted.
    pub nonce: Option<String>,
    /// Value of `TRANSLATION_FIELD`, if submitted.
    pub translation: Option<String>,
    /// Automated background save by the editor.
    pub is_autosave: bool,
}

impl SaveRequest {
    /// Selected partner. Absent, blank, `0` or unparsable values all mean
    /// "no translation".
    pub fn selected_partner(&self) -> Option<RecordId> {
        let value = self.translation.as_deref()?.trim();
        if value.is_empty() || value == "0" {
            return None;
        }
        Uuid::parse_str(value).ok()
    }
}

/// Why a save left translation links untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Record is not stored in either managed category.
    UnmanagedRecord,
    MissingNonce,
    InvalidNonce,
    Autosave,
    PermissionDenied,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnmanagedRecord => "unmanaged_record",
            Self::MissingNonce => "missing_nonce",
            Self::InvalidNonce => "invalid_nonce",
            Self::Autosave => "autosave",
            Self::PermissionDenied => "permission_denied",
        }
    }
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the save preconditions for `request`.
pub fn authorize_save(
    request: &SaveRequest,
    nonces: &impl NonceVerifier,
    permission: &impl EditPermission,
) -> Result<(), SkipReason> {
    let token = request.nonce.as_deref().ok_or(SkipReason::MissingNonce)?;
    if !nonces.verify(TRANSLATION_NONCE_ACTION, token) {
        return Err(SkipReason::InvalidNonce);
    }
    if request.is_autosave {
        return Err(SkipReason::Autosave);
    }
    if !permission.can_edit(request.record_id) {
        return Err(SkipReason::PermissionDenied);
    }
    Ok(())
}
