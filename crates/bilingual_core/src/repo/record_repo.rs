//! Content store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide record lookup/listing and keyed per-record metadata.
//! - Offer an atomic section so multi-step metadata updates commit together.
//!
//! # Invariants
//! - Listing is deterministic: `title ASC, uuid ASC`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{ensure_schema_ready, DbError};
use crate::model::record::{Category, ContentRecord, RecordId, RecordValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for record and metadata operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    DuplicateRecord(RecordId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateRecord(id) => write!(f, "record already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateRecord(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store capability consumed by the link registry and the site adapter.
pub trait ContentStore {
    /// Persists a new record.
    fn create_record(&self, record: &ContentRecord) -> RepoResult<RecordId>;
    /// Loads one record by ID.
    fn get_record(&self, id: RecordId) -> RepoResult<Option<ContentRecord>>;
    /// Lists records of one category ordered by title.
    fn list_records(&self, category: Category) -> RepoResult<Vec<ContentRecord>>;
    /// Reads one metadata value.
    fn get_meta(&self, id: RecordId, key: &str) -> RepoResult<Option<String>>;
    /// Inserts or replaces one metadata value.
    fn set_meta(&self, id: RecordId, key: &str, value: &str) -> RepoResult<()>;
    /// Removes one metadata value. Removing a missing value is not an error.
    fn delete_meta(&self, id: RecordId, key: &str) -> RepoResult<()>;
    /// Runs `work` so that its reads and writes form one unit.
    ///
    /// Writes are discarded when `work` returns an error. Nested calls join
    /// the outer unit.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>;
}

/// SQLite-backed content store.
pub struct SqliteContentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContentStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["content_records", "record_meta"])?;
        Ok(Self { conn })
    }
}

impl ContentStore for SqliteContentStore<'_> {
    fn create_record(&self, record: &ContentRecord) -> RepoResult<RecordId> {
        record.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO content_records (uuid, category, title, slug)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (uuid) DO NOTHING;",
            params![
                record.id.to_string(),
                record.category.as_str(),
                record.title.as_str(),
                record.slug.as_str(),
            ],
        )?;
        if inserted == 0 {
            return Err(RepoError::DuplicateRecord(record.id));
        }

        Ok(record.id)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<ContentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, category, title, slug
             FROM content_records
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn list_records(&self, category: Category) -> RepoResult<Vec<ContentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, category, title, slug
             FROM content_records
             WHERE category = ?1
             ORDER BY title ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([category.as_str()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn get_meta(&self, id: RecordId, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT meta_value
                 FROM record_meta
                 WHERE record_uuid = ?1 AND meta_key = ?2;",
                params![id.to_string(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_meta(&self, id: RecordId, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO record_meta (record_uuid, meta_key, meta_value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (record_uuid, meta_key) DO UPDATE
             SET meta_value = excluded.meta_value,
                 updated_at = (strftime('%s', 'now') * 1000);",
            params![id.to_string(), key, value],
        )?;
        Ok(())
    }

    fn delete_meta(&self, id: RecordId, key: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM record_meta WHERE record_uuid = ?1 AND meta_key = ?2;",
            params![id.to_string(), key],
        )?;
        Ok(())
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>,
    {
        if !self.conn.is_autocommit() {
            return work();
        }

        // Immediate: take the write lock before the first read so the
        // read-modify-write sequence cannot interleave with another writer.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = work()?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<ContentRecord> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in content_records.uuid"
        ))
    })?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in content_records.category"
        ))
    })?;

    let record = ContentRecord {
        id,
        category,
        title: row.get("title")?,
        slug: row.get("slug")?,
    };
    record.validate()?;
    Ok(record)
}
