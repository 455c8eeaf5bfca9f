//! Storage module for persistent data
//!
//! SQLite holds document metadata and conversation history; uploaded
//! originals live in a plain directory on disk.

mod database;
mod uploads;

pub use database::Database;
pub use uploads::{secure_filename, StoredUpload, UploadStore};
