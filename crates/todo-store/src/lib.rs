//! Todo Storage Layer
//!
//! Implements the `DocumentStore` trait twice:
//!
//! - [`SqliteStore`]: persistent storage in a single SQLite table
//! - [`MemoryStore`]: in-process map, used by tests and throwaway runs
//!
//! # Examples
//!
//! ```no_run
//! use todo_store::SqliteStore;
//!
//! let store = SqliteStore::open("todo.db").unwrap();
//! // Store is now ready for document operations
//! ```

#![warn(missing_docs)]

mod memory;

pub use memory::{MemoryStore, MemoryStoreError};

use async_trait::async_trait;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use todo_domain::{Clause, Document, DocumentId, DocumentStore, DocumentStream, DocumentUpdate, Filter};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Rows buffered between the SQLite reader and the consumer of a search
const STREAM_BUFFER: usize = 32;

const SELECT_COLUMNS: &str = "SELECT id, title, description, tags, state, reminder FROM todos";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Tag list could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The store was closed
    #[error("Store is closed")]
    Closed,

    /// A previous operation panicked while holding the connection
    #[error("Connection lock poisoned")]
    Poisoned,

    /// The blocking worker did not complete
    #[error("Storage task failed: {0}")]
    Task(String),
}

/// SQLite-based implementation of `DocumentStore`
///
/// The connection sits behind a mutex and every statement runs on the
/// blocking thread pool, so one store can be shared by all in-flight calls.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use todo_store::SqliteStore;
    ///
    /// let store = SqliteStore::open("todo.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        Self::initialize(&conn)?;
        tracing::debug!(path = %path.as_ref().display(), "sqlite store opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Register SQL functions and create the schema
    fn initialize(conn: &Connection) -> Result<(), StoreError> {
        conn.create_scalar_function(
            "regexp",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                // `X REGEXP Y` calls regexp(Y, X); the pattern is compiled once per statement
                let regex: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                    Ok(Regex::new(vr.as_str()?)?)
                })?;
                let text = ctx
                    .get_raw(1)
                    .as_str()
                    .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;
                Ok(regex.is_match(text))
            },
        )?;

        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Run `f` against the open connection on the blocking pool
    async fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            let conn = guard.as_ref().ok_or(StoreError::Closed)?;
            f(conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Convert a row of `SELECT_COLUMNS` into a document
    fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = DocumentId::from_bytes(&id_bytes).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                Type::Blob,
                Box::new(StoreError::InvalidData(format!(
                    "Expected 16 bytes for document id, got {}",
                    id_bytes.len()
                ))),
            )
        })?;

        let tags_json: String = row.get(3)?;
        let tags: Vec<String> = serde_json::from_str(&tags_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(Document {
            id: Some(id),
            title: row.get(1)?,
            description: row.get(2)?,
            tags,
            state: row.get(4)?,
            reminder: row.get(5)?,
        })
    }
}

/// Compile a filter into a `WHERE` clause and its positional parameters
fn compile_filter(filter: &Filter) -> (String, Vec<Value>) {
    let mut sql = format!("{} WHERE 1=1", SELECT_COLUMNS);
    let mut params: Vec<Value> = Vec::new();

    for clause in filter.clauses() {
        match clause {
            Clause::DescriptionMatches(regex) => {
                sql.push_str(" AND description REGEXP ?");
                params.push(Value::Text(regex.as_str().to_string()));
            }
            Clause::StateIn(names) if names.is_empty() => {
                sql.push_str(" AND 0");
            }
            Clause::StateIn(names) => {
                let placeholders = vec!["?"; names.len()].join(", ");
                sql.push_str(&format!(" AND state IN ({})", placeholders));
                params.extend(names.iter().cloned().map(Value::Text));
            }
            Clause::TagsAll(tags) => {
                for tag in tags {
                    sql.push_str(
                        " AND EXISTS (SELECT 1 FROM json_each(todos.tags) WHERE json_each.value = ?)",
                    );
                    params.push(Value::Text(tag.clone()));
                }
            }
        }
    }

    sql.push_str(" ORDER BY rowid");
    (sql, params)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    type Error = StoreError;

    async fn insert_one(&self, document: Document) -> Result<Option<DocumentId>, Self::Error> {
        let tags = serde_json::to_string(&document.tags)?;
        let id = DocumentId::new();

        self.with_connection(move |conn| {
            let returned: Option<Vec<u8>> = conn
                .query_row(
                    "INSERT INTO todos (id, title, description, tags, state, reminder)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     RETURNING id",
                    params![
                        id.to_bytes().as_slice(),
                        &document.title,
                        &document.description,
                        &tags,
                        &document.state,
                        document.reminder,
                    ],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(returned.and_then(|bytes| DocumentId::from_bytes(&bytes)))
        })
        .await
    }

    async fn find_one(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        self.with_connection(move |conn| {
            let document = conn
                .query_row(
                    &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                    params![id.to_bytes().as_slice()],
                    Self::document_from_row,
                )
                .optional()?;
            Ok(document)
        })
        .await
    }

    async fn update_one(&self, id: DocumentId, update: &DocumentUpdate) -> Result<u64, Self::Error> {
        let update = update.clone();
        let tags = serde_json::to_string(&update.tags)?;

        self.with_connection(move |conn| {
            let mut sql = String::from("UPDATE todos SET tags = ?, state = ?");
            let mut values = vec![Value::Text(tags), Value::Text(update.state)];

            if let Some(title) = update.title {
                sql.push_str(", title = ?");
                values.push(Value::Text(title));
            }
            if let Some(description) = update.description {
                sql.push_str(", description = ?");
                values.push(Value::Text(description));
            }
            if let Some(reminder) = update.reminder {
                sql.push_str(", reminder = ?");
                values.push(Value::Integer(reminder));
            }

            sql.push_str(" WHERE id = ?");
            values.push(Value::Blob(id.to_bytes().to_vec()));

            let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
            Ok(changed as u64)
        })
        .await
    }

    async fn delete_one(&self, id: DocumentId) -> Result<u64, Self::Error> {
        self.with_connection(move |conn| {
            let removed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id.to_bytes().as_slice()])?;
            Ok(removed as u64)
        })
        .await
    }

    async fn find(&self, filter: Filter) -> Result<DocumentStream<Self::Error>, Self::Error> {
        let (sql, values) = compile_filter(&filter);
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let result = (|| -> Result<(), StoreError> {
                let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
                let conn = guard.as_ref().ok_or(StoreError::Closed)?;
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(values.iter()), Self::document_from_row)?;
                for row in rows {
                    // receiver gone: the caller stopped reading
                    if tx.blocking_send(Ok(row?)).is_err() {
                        break;
                    }
                }
                Ok(())
            })();

            if let Err(e) = result {
                let _ = tx.blocking_send(Err(e));
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }

    async fn close(&self) -> Result<(), Self::Error> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            if let Some(conn) = guard.take() {
                conn.close().map_err(|(_, e)| StoreError::Database(e))?;
                tracing::debug!("sqlite store closed");
            }
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_domain::State;

    #[test]
    fn test_compile_empty_filter() {
        let (sql, params) = compile_filter(&Filter::all());
        assert_eq!(sql, format!("{} WHERE 1=1 ORDER BY rowid", SELECT_COLUMNS));
        assert!(params.is_empty());
    }

    #[test]
    fn test_compile_filter_parameters() {
        let filter = Filter::all()
            .and(Clause::DescriptionMatches(Regex::new("^a").unwrap()))
            .and(Clause::StateIn(vec![
                State::Done.as_str().to_string(),
                State::InProgress.as_str().to_string(),
            ]))
            .and(Clause::TagsAll(vec!["a".to_string(), "b".to_string()]));

        let (sql, params) = compile_filter(&filter);

        assert!(sql.contains("description REGEXP ?"));
        assert!(sql.contains("state IN (?, ?)"));
        assert_eq!(sql.matches("json_each").count(), 4);
        assert_eq!(
            params,
            vec![
                Value::Text("^a".to_string()),
                Value::Text("DONE".to_string()),
                Value::Text("IN_PROGRESS".to_string()),
                Value::Text("a".to_string()),
                Value::Text("b".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let store = SqliteStore::open(":memory:").unwrap();
        store.close().await.unwrap();
        store.close().await.unwrap();

        assert!(matches!(store.ping().await, Err(StoreError::Closed)));
    }
}
