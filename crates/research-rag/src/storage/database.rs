//! SQLite store for documents and conversation history

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Conversation, Document, FileType, NewConversation, NewDocument};

const DOCUMENT_COLUMNS: &str =
    "id, filename, original_filename, file_path, file_type, upload_time, processed, summary";

const CONVERSATION_COLUMNS: &str =
    "id, session_id, document_id, question, answer, timestamp, context_used";

/// SQLite-backed document and conversation store
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::database("Failed to open database", e))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database("Failed to open in-memory database", e))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        "#,
        )
        .map_err(|e| Error::database("Failed to set pragmas", e))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                original_filename TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_type TEXT NOT NULL,
                upload_time TEXT NOT NULL,
                processed INTEGER NOT NULL DEFAULT 0,
                summary TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_documents_upload_time ON documents(upload_time);

            CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                document_id INTEGER REFERENCES documents(id) ON DELETE CASCADE,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                context_used TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_conversations_session ON conversations(session_id, timestamp);
            CREATE INDEX IF NOT EXISTS idx_conversations_document ON conversations(document_id);
        "#,
        )
        .map_err(|e| Error::database("Failed to run migrations", e))?;

        tracing::info!("Database migrations complete");
        Ok(())
    }

    // ==================== Documents ====================

    /// Insert a freshly uploaded, not yet processed document
    pub fn insert_document(&self, doc: &NewDocument) -> Result<Document> {
        let conn = self.conn.lock();
        let upload_time = Utc::now();

        conn.execute(
            "INSERT INTO documents (filename, original_filename, file_path, file_type, upload_time, processed)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                doc.filename,
                doc.original_filename,
                doc.file_path.to_string_lossy(),
                doc.file_type.as_str(),
                upload_time,
            ],
        )
        .map_err(|e| Error::database("Failed to insert document", e))?;

        Ok(Document {
            id: conn.last_insert_rowid(),
            filename: doc.filename.clone(),
            original_filename: doc.original_filename.clone(),
            file_path: doc.file_path.clone(),
            file_type: doc.file_type,
            upload_time,
            processed: false,
            summary: None,
        })
    }

    /// Record a successful ingestion
    pub fn mark_processed(&self, id: i64, summary: &str) -> Result<Document> {
        {
            let conn = self.conn.lock();
            let updated = conn
                .execute(
                    "UPDATE documents SET processed = 1, summary = ?2 WHERE id = ?1",
                    params![id, summary],
                )
                .map_err(|e| Error::database("Failed to update document", e))?;

            if updated == 0 {
                return Err(Error::DocumentNotFound(id.to_string()));
            }
        }

        self.get_document(id)?
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))
    }

    /// Get a document by id
    pub fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let conn = self.conn.lock();

        conn.query_row(
            &format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS),
            params![id],
            row_to_document,
        )
        .optional()
        .map_err(|e| Error::database("Failed to get document", e))
    }

    /// Get several documents, in the order the ids were given; unknown ids are skipped
    pub fn get_documents(&self, ids: &[i64]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM documents WHERE id IN ({})",
                DOCUMENT_COLUMNS, placeholders
            ))
            .map_err(|e| Error::database("Failed to prepare query", e))?;

        let mut found: Vec<Document> = stmt
            .query_map(params_from_iter(ids.iter()), row_to_document)
            .map_err(|e| Error::database("Failed to get documents", e))?
            .collect::<rusqlite::Result<_>>()
            .map_err(|e| Error::database("Failed to read document row", e))?;

        found.sort_by_key(|doc| ids.iter().position(|id| *id == doc.id));
        Ok(found)
    }

    /// List all documents, newest first
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM documents ORDER BY upload_time DESC, id DESC",
                DOCUMENT_COLUMNS
            ))
            .map_err(|e| Error::database("Failed to prepare query", e))?;

        let docs = stmt
            .query_map([], row_to_document)
            .map_err(|e| Error::database("Failed to list documents", e))?
            .collect::<rusqlite::Result<_>>()
            .map_err(|e| Error::database("Failed to read document row", e))?;

        Ok(docs)
    }

    /// Delete a document and every conversation that references it.
    ///
    /// Returns the removed row so the caller can clean up the stored file.
    pub fn delete_document(&self, id: i64) -> Result<Option<Document>> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::database("Failed to begin transaction", e))?;

        let doc = tx
            .query_row(
                &format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS),
                params![id],
                row_to_document,
            )
            .optional()
            .map_err(|e| Error::database("Failed to get document", e))?;

        let Some(doc) = doc else {
            return Ok(None);
        };

        let conversations = tx
            .execute("DELETE FROM conversations WHERE document_id = ?1", params![id])
            .map_err(|e| Error::database("Failed to delete conversations", e))?;
        tx.execute("DELETE FROM documents WHERE id = ?1", params![id])
            .map_err(|e| Error::database("Failed to delete document", e))?;
        tx.commit()
            .map_err(|e| Error::database("Failed to commit delete", e))?;

        tracing::info!(
            "Deleted document {} ({} conversations removed)",
            id,
            conversations
        );
        Ok(Some(doc))
    }

    // ==================== Conversations ====================

    /// Store a question/answer exchange
    pub fn insert_conversation(&self, conv: &NewConversation) -> Result<Conversation> {
        let conn = self.conn.lock();
        let timestamp = Utc::now();

        conn.execute(
            "INSERT INTO conversations (session_id, document_id, question, answer, timestamp, context_used)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                conv.session_id,
                conv.document_id,
                conv.question,
                conv.answer,
                timestamp,
                conv.context_used,
            ],
        )
        .map_err(|e| Error::database("Failed to insert conversation", e))?;

        Ok(Conversation {
            id: conn.last_insert_rowid(),
            session_id: conv.session_id.clone(),
            document_id: conv.document_id,
            question: conv.question.clone(),
            answer: conv.answer.clone(),
            timestamp,
            context_used: conv.context_used.clone(),
        })
    }

    /// Full history for a session, oldest first
    pub fn list_conversations(&self, session_id: &str) -> Result<Vec<Conversation>> {
        self.query_conversations(
            &format!(
                "SELECT {} FROM conversations WHERE session_id = ?1 ORDER BY timestamp ASC, id ASC",
                CONVERSATION_COLUMNS
            ),
            params![session_id],
        )
    }

    /// Most recent exchanges for a session, newest first
    pub fn recent_conversations(&self, session_id: &str, limit: usize) -> Result<Vec<Conversation>> {
        self.query_conversations(
            &format!(
                "SELECT {} FROM conversations WHERE session_id = ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2",
                CONVERSATION_COLUMNS
            ),
            params![session_id, limit as i64],
        )
    }

    fn query_conversations(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Conversation>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::database("Failed to prepare query", e))?;

        let conversations = stmt
            .query_map(params, row_to_conversation)
            .map_err(|e| Error::database("Failed to list conversations", e))?
            .collect::<rusqlite::Result<_>>()
            .map_err(|e| Error::database("Failed to read conversation row", e))?;

        Ok(conversations)
    }

    /// Delete every conversation in a session
    pub fn clear_session(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock();

        conn.execute(
            "DELETE FROM conversations WHERE session_id = ?1",
            params![session_id],
        )
        .map_err(|e| Error::database("Failed to clear session", e))
    }
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<Document> {
    let file_type_str: String = row.get(4)?;
    let file_type = FileType::from_extension(&file_type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown file type '{}'", file_type_str).into(),
        )
    })?;
    let file_path: String = row.get(3)?;

    Ok(Document {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_filename: row.get(2)?,
        file_path: PathBuf::from(file_path),
        file_type,
        upload_time: row.get(5)?,
        processed: row.get(6)?,
        summary: row.get(7)?,
    })
}

fn row_to_conversation(row: &rusqlite::Row) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        session_id: row.get(1)?,
        document_id: row.get(2)?,
        question: row.get(3)?,
        answer: row.get(4)?,
        timestamp: row.get(5)?,
        context_used: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_doc(name: &str) -> NewDocument {
        NewDocument {
            filename: format!("uuid_{}", name),
            original_filename: name.to_string(),
            file_path: PathBuf::from(format!("/tmp/uuid_{}", name)),
            file_type: FileType::from_path(name).unwrap(),
        }
    }

    fn exchange(session: &str, document_id: Option<i64>, question: &str) -> NewConversation {
        NewConversation {
            session_id: session.to_string(),
            document_id,
            question: question.to_string(),
            answer: format!("answer: {}", question),
            context_used: None,
        }
    }

    #[test]
    fn test_insert_and_mark_processed() {
        let db = Database::in_memory().unwrap();

        let doc = db.insert_document(&new_doc("paper.pdf")).unwrap();
        assert!(!doc.processed);
        assert!(doc.summary.is_none());

        let updated = db.mark_processed(doc.id, "A paper about soil.").unwrap();
        assert!(updated.processed);
        assert_eq!(updated.summary.as_deref(), Some("A paper about soil."));
        assert_eq!(updated.file_type, FileType::Pdf);
        assert_eq!(updated.file_path, PathBuf::from("/tmp/uuid_paper.pdf"));
    }

    #[test]
    fn test_mark_missing_document() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.mark_processed(42, "x"),
            Err(Error::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_list_documents_newest_first() {
        let db = Database::in_memory().unwrap();
        let a = db.insert_document(&new_doc("a.txt")).unwrap();
        let b = db.insert_document(&new_doc("b.txt")).unwrap();

        let ids: Vec<i64> = db.list_documents().unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn test_get_documents_preserves_request_order() {
        let db = Database::in_memory().unwrap();
        let a = db.insert_document(&new_doc("a.txt")).unwrap();
        let b = db.insert_document(&new_doc("b.txt")).unwrap();

        let docs = db.get_documents(&[b.id, 999, a.id]).unwrap();
        let ids: Vec<i64> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn test_delete_cascades_conversations() {
        let db = Database::in_memory().unwrap();
        let doc = db.insert_document(&new_doc("a.txt")).unwrap();
        let other = db.insert_document(&new_doc("b.txt")).unwrap();

        db.insert_conversation(&exchange("s1", Some(doc.id), "about a")).unwrap();
        db.insert_conversation(&exchange("s1", Some(other.id), "about b")).unwrap();
        db.insert_conversation(&exchange("s1", None, "general")).unwrap();

        let removed = db.delete_document(doc.id).unwrap();
        assert_eq!(removed.map(|d| d.id), Some(doc.id));
        assert!(db.get_document(doc.id).unwrap().is_none());

        let remaining: Vec<String> = db
            .list_conversations("s1")
            .unwrap()
            .into_iter()
            .map(|c| c.question)
            .collect();
        assert_eq!(remaining, vec!["about b", "general"]);

        assert!(db.delete_document(doc.id).unwrap().is_none());
    }

    #[test]
    fn test_conversation_must_reference_existing_document() {
        let db = Database::in_memory().unwrap();
        let result = db.insert_conversation(&exchange("s1", Some(12345), "orphan"));
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[test]
    fn test_recent_conversations_newest_first_with_limit() {
        let db = Database::in_memory().unwrap();
        for i in 0..5 {
            db.insert_conversation(&exchange("s1", None, &format!("q{}", i))).unwrap();
        }

        let recent: Vec<String> = db
            .recent_conversations("s1", 3)
            .unwrap()
            .into_iter()
            .map(|c| c.question)
            .collect();
        assert_eq!(recent, vec!["q4", "q3", "q2"]);

        let all = db.list_conversations("s1").unwrap();
        assert_eq!(all.first().map(|c| c.question.as_str()), Some("q0"));
    }

    #[test]
    fn test_clear_session_keeps_other_sessions() {
        let db = Database::in_memory().unwrap();
        db.insert_conversation(&exchange("mine", None, "q1")).unwrap();
        db.insert_conversation(&exchange("mine", None, "q2")).unwrap();
        db.insert_conversation(&exchange("theirs", None, "q3")).unwrap();

        assert_eq!(db.clear_session("mine").unwrap(), 2);
        assert!(db.list_conversations("mine").unwrap().is_empty());
        assert_eq!(db.list_conversations("theirs").unwrap().len(), 1);
    }
}
