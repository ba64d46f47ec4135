//! Storage layer for kanzanso.
//!
//! This module provides `SQLite`-based persistent storage for every resource
//! the service manages. Resources are stored as JSON documents grouped into
//! collections; see [`Document`].

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, ToSql};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Insert-or-replace statement shared by [`Storage::save`] and [`Storage::save_all`].
const UPSERT_DOCUMENT: &str = r"
INSERT INTO documents (collection, id, owner_id, body)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(collection, id) DO UPDATE SET
    owner_id = excluded.owner_id,
    body = excluded.body,
    updated_at = datetime('now')
";

/// A value persisted as a JSON document.
///
/// Implementors name their collection and expose their id. Values owned by a
/// user also expose the owner, which enables [`Storage::list_owned`] and
/// cascading deletes through [`Storage::delete_owned_by`].
pub trait Document: Serialize + DeserializeOwned {
    /// Collection the document lives in.
    const COLLECTION: &'static str;

    /// Unique id within the collection.
    fn id(&self) -> &str;

    /// Id of the owning user, if any.
    fn owner_id(&self) -> Option<&str> {
        None
    }
}

/// Document store backed by a single `SQLite` database.
///
/// The connection sits behind a mutex so one `Storage` can be shared across
/// request handlers. Each method takes that lock for a single statement or
/// transaction; sequences that read, modify and write back go through
/// [`Storage::exclusive`].
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
    /// Held for the whole of an [`Storage::exclusive`] section.
    updates: Mutex<()>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
            updates: Mutex::new(()),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
            updates: Mutex::new(()),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database mutex poisoned"))
    }

    /// Run `f` with no other exclusive section running on this store.
    ///
    /// Plain reads and writes still go through while `f` runs; only other
    /// `exclusive` callers wait. The lock is not re-entrant, so `f` must not
    /// call `exclusive` itself.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or [`Error::Internal`] if a previous
    /// section panicked.
    pub fn exclusive<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .updates
            .lock()
            .map_err(|_| Error::internal("update mutex poisoned"))?;
        f()
    }

    /// Insert or replace a document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub fn save<T: Document>(&self, doc: &T) -> Result<()> {
        let body = serde_json::to_string(doc)?;
        self.lock()?.execute(
            UPSERT_DOCUMENT,
            params![T::COLLECTION, doc.id(), doc.owner_id(), body],
        )?;
        debug!(collection = T::COLLECTION, id = doc.id(), "saved document");
        Ok(())
    }

    /// Insert or replace several documents in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    /// Nothing is written in that case.
    pub fn save_all<T: Document>(&self, docs: &[T]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for doc in docs {
            let body = serde_json::to_string(doc)?;
            tx.execute(
                UPSERT_DOCUMENT,
                params![T::COLLECTION, doc.id(), doc.owner_id(), body],
            )?;
        }
        tx.commit()?;
        debug!(collection = T::COLLECTION, count = docs.len(), "saved documents");
        Ok(())
    }

    /// Get a document by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or deserialization fails.
    pub fn get<T: Document>(&self, id: &str) -> Result<Option<T>> {
        let body: Option<String> = self
            .lock()?
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![T::COLLECTION, id],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|b| serde_json::from_str(&b).map_err(Error::from))
            .transpose()
    }

    /// Check whether a document exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn exists<T: Document>(&self, id: &str) -> Result<bool> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1 AND id = ?2",
            params![T::COLLECTION, id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Delete a document by id.
    ///
    /// Returns `true` if a document was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete<T: Document>(&self, id: &str) -> Result<bool> {
        let affected = self.lock()?.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![T::COLLECTION, id],
        )?;
        Ok(affected > 0)
    }

    /// List every document of a collection in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or deserialization fails.
    pub fn list<T: Document>(&self) -> Result<Vec<T>> {
        self.query_bodies(
            "SELECT body FROM documents WHERE collection = ?1 ORDER BY rowid",
            params![T::COLLECTION],
        )
    }

    /// List the documents of a collection owned by a user, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or deserialization fails.
    pub fn list_owned<T: Document>(&self, owner_id: &str) -> Result<Vec<T>> {
        self.query_bodies(
            r"
            SELECT body FROM documents
            WHERE collection = ?1 AND owner_id = ?2
            ORDER BY rowid
            ",
            params![T::COLLECTION, owner_id],
        )
    }

    /// Find documents whose top-level JSON `field` equals `value`.
    ///
    /// When `owner_id` is given, only that user's documents are searched.
    /// Booleans are compared as `0`/`1`, the way `SQLite` stores JSON booleans.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or deserialization fails.
    pub fn find_by_field<T: Document>(
        &self,
        owner_id: Option<&str>,
        field: &str,
        value: &dyn ToSql,
    ) -> Result<Vec<T>> {
        let path = format!("$.{field}");
        self.query_bodies(
            r"
            SELECT body FROM documents
            WHERE collection = ?1
              AND (?2 IS NULL OR owner_id = ?2)
              AND json_extract(body, ?3) = ?4
            ORDER BY rowid
            ",
            params![T::COLLECTION, owner_id, path, value],
        )
    }

    /// Find the first document whose top-level JSON `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or deserialization fails.
    pub fn find_one_by_field<T: Document>(
        &self,
        owner_id: Option<&str>,
        field: &str,
        value: &dyn ToSql,
    ) -> Result<Option<T>> {
        Ok(self
            .find_by_field(owner_id, field, value)?
            .into_iter()
            .next())
    }

    /// Count the documents of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count<T: Document>(&self) -> Result<i64> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [T::COLLECTION],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete every document, in any collection, owned by a user.
    ///
    /// Returns the number of documents deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_owned_by(&self, owner_id: &str) -> Result<usize> {
        let affected = self
            .lock()?
            .execute("DELETE FROM documents WHERE owner_id = ?1", [owner_id])?;

        if affected > 0 {
            info!("Deleted {} documents owned by {}", affected, owner_id);
        }
        Ok(affected)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let collections = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(
                r"
                SELECT collection, COUNT(*) FROM documents
                GROUP BY collection ORDER BY collection
                ",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CollectionCount {
                        name: row.get(0)?,
                        documents: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        let total_documents = collections.iter().map(|c| c.documents).sum();

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_documents,
            collections,
            db_size_bytes,
        })
    }

    fn query_bodies<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<T>> {
        let bodies = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params, |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(Error::from))
            .collect()
    }
}

/// Number of documents in one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCount {
    /// Collection name.
    pub name: String,
    /// Documents stored in it.
    pub documents: i64,
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Total number of documents stored.
    pub total_documents: i64,
    /// Per-collection document counts.
    pub collections: Vec<CollectionCount>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
