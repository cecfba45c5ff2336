//! SQLite corpus backend.
//!
//! One `documents` table in insertion order; vectors are f32 little-endian
//! blobs. WAL journal, NORMAL sync, bounded busy timeout.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use docket_core::errors::{StoreError, StoreResult};
use docket_core::Metadata;

use super::CorpusBackend;
use crate::corpus::{Corpus, StoredDocument};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS documents (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        dedupe_key TEXT NOT NULL UNIQUE,
        text TEXT NOT NULL,
        metadata TEXT NOT NULL,
        embedding BLOB NOT NULL,
        dimensions INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS corpus_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

const FINGERPRINT_KEY: &str = "fingerprint";

pub struct SqliteBackend {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    pub const NAME: &'static str = "sqlite";

    /// Open (or create) the database, apply pragmas and the schema.
    ///
    /// Any failure here means SQLite is unusable at `path`; `auto`
    /// selection treats it as the signal to fall back.
    pub fn open(path: &Path, busy_timeout: Duration) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Persistence {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        let conn = Connection::open(path).map_err(to_backend_err)?;
        apply_pragmas(&conn, busy_timeout)?;
        conn.execute_batch(SCHEMA).map_err(to_backend_err)?;
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::CorruptState {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl CorpusBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<Corpus> {
        let conn = self.conn();
        let fingerprint: Option<String> = conn
            .query_row(
                "SELECT value FROM corpus_meta WHERE key = ?1",
                params![FINGERPRINT_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(to_backend_err)?;

        let mut stmt = conn
            .prepare(
                "SELECT dedupe_key, text, metadata, embedding, dimensions
                 FROM documents ORDER BY seq",
            )
            .map_err(to_backend_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(to_backend_err)?;

        let mut documents = Vec::new();
        for row in rows {
            let (key, text, metadata_json, blob, dims) = row.map_err(to_backend_err)?;
            let metadata: Metadata = serde_json::from_str(&metadata_json)
                .map_err(|e| self.corrupt(format!("metadata of '{key}': {e}")))?;
            let vector = bytes_to_f32_vec(&blob);
            if vector.len() as i64 != dims {
                return Err(self.corrupt(format!(
                    "vector of '{key}' has {} values, row says {dims}",
                    vector.len()
                )));
            }
            documents.push(StoredDocument {
                key,
                text,
                metadata,
                vector,
            });
        }
        Ok(Corpus::new(documents, fingerprint))
    }

    fn append(&self, documents: &[StoredDocument], fingerprint: &str) -> StoreResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(to_backend_err)?;
        insert_documents(&tx, documents)?;
        tx.execute(
            "INSERT OR IGNORE INTO corpus_meta (key, value) VALUES (?1, ?2)",
            params![FINGERPRINT_KEY, fingerprint],
        )
        .map_err(to_backend_err)?;
        tx.commit().map_err(to_backend_err)
    }

    fn replace_all(&self, corpus: &Corpus) -> StoreResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(to_backend_err)?;
        tx.execute("DELETE FROM documents", []).map_err(to_backend_err)?;
        insert_documents(&tx, &corpus.documents)?;
        let recorded = match &corpus.fingerprint {
            Some(fp) => tx.execute(
                "INSERT INTO corpus_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![FINGERPRINT_KEY, fp],
            ),
            None => tx.execute(
                "DELETE FROM corpus_meta WHERE key = ?1",
                params![FINGERPRINT_KEY],
            ),
        };
        recorded.map_err(to_backend_err)?;
        tx.commit().map_err(to_backend_err)
    }
}

fn insert_documents(conn: &Connection, documents: &[StoredDocument]) -> StoreResult<()> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO documents (dedupe_key, text, metadata, embedding, dimensions)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(to_backend_err)?;
    for doc in documents {
        let metadata = serde_json::to_string(&doc.metadata).map_err(|e| StoreError::Backend {
            backend: SqliteBackend::NAME.to_string(),
            message: format!("serialize metadata: {e}"),
        })?;
        stmt.execute(params![
            doc.key,
            doc.text,
            metadata,
            f32_vec_to_bytes(&doc.vector),
            doc.vector.len() as i64,
        ])
        .map_err(to_backend_err)?;
    }
    Ok(())
}

/// WAL mode, NORMAL sync and a bounded busy timeout on every connection.
fn apply_pragmas(conn: &Connection, busy_timeout: Duration) -> StoreResult<()> {
    conn.busy_timeout(busy_timeout).map_err(to_backend_err)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -16000;
        ",
    )
    .map_err(to_backend_err)
}

fn to_backend_err(e: rusqlite::Error) -> StoreError {
    StoreError::Backend {
        backend: SqliteBackend::NAME.to_string(),
        message: e.to_string(),
    }
}

fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
