//! Document and chunk types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
}

impl FileType {
    /// Detect file type from an extension (case-insensitive, no leading dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Detect file type from a file name or path
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Extension as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Database ID
    pub id: i64,
    /// Stored (UUID-prefixed, sanitised) filename
    pub filename: String,
    /// Filename as uploaded
    pub original_filename: String,
    /// Location of the stored file
    #[serde(skip_serializing, default)]
    pub file_path: PathBuf,
    /// File type
    pub file_type: FileType,
    /// Upload timestamp
    pub upload_time: DateTime<Utc>,
    /// Whether ingestion succeeded
    pub processed: bool,
    /// LLM-generated summary
    pub summary: Option<String>,
}

/// Fields needed to insert a document row
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub original_filename: String,
    pub file_path: PathBuf,
    pub file_type: FileType,
}

/// A slice of document text used as the retrieval unit
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Owning document
    pub document_id: i64,
    /// Position within the document (0-based)
    pub index: u32,
    /// Chunk text
    pub content: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(document_id: i64, index: u32, content: impl Into<String>) -> Self {
        Self {
            document_id,
            index,
            content: content.into(),
        }
    }

    /// First `max_chars` characters followed by "..."
    pub fn preview(&self, max_chars: usize) -> String {
        format!("{}...", truncate_chars(&self.content, max_chars))
    }
}

/// Take at most `max_chars` characters from the start of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
