//! Content record domain model.
//!
//! # Responsibility
//! - Define the page-like record annotated with translation links.
//! - Validate routing slugs and titles before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - `slug` is a single lowercase URL segment.
//! - `title` is never blank.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Stable identifier of a content record.
pub type RecordId = Uuid;

/// Which of the two managed content categories a record belongs to.
///
/// `Primary` holds default-language pages, `Secondary` holds pages in the
/// configured second language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Primary,
    Secondary,
}

impl Category {
    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    /// Parses a storage value written by [`Category::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            _ => None,
        }
    }

    /// The category holding translations of records in `self`.
    pub fn opposite(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

/// Page-like unit of content owned by the host store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: RecordId,
    pub category: Category,
    /// Display title shown in edit panels.
    pub title: String,
    /// Routing segment used to build the public URL.
    pub slug: String,
}

impl ContentRecord {
    /// Creates a record with a generated stable ID.
    pub fn new(category: Category, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), category, title, slug)
    }

    /// Creates a record with a caller-provided ID.
    ///
    /// Used by import paths where identity already exists in the host.
    pub fn with_id(
        id: RecordId,
        category: Category,
        title: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category,
            title: title.into(),
            slug: slug.into(),
        }
    }

    /// Validates title and slug.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.title.trim().is_empty() {
            return Err(RecordValidationError::BlankTitle);
        }
        if self.slug.is_empty() {
            return Err(RecordValidationError::EmptySlug);
        }
        if !SLUG_RE.is_match(&self.slug) {
            return Err(RecordValidationError::InvalidSlug(self.slug.clone()));
        }
        Ok(())
    }
}

/// Reasons a record cannot be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    BlankTitle,
    EmptySlug,
    InvalidSlug(String),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "record title must not be blank"),
            Self::EmptySlug => write!(f, "record slug must not be empty"),
            Self::InvalidSlug(slug) => write!(
                f,
                "record slug `{slug}` must be lowercase alphanumeric segments joined by `-`"
            ),
        }
    }
}

impl Error for RecordValidationError {}
