//! On-disk storage for uploaded files

use std::path::{Path, PathBuf};

use crate::error::Result;

/// A file written to the upload directory
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Stored name: `{uuid}_{secure original}`
    pub filename: String,
    /// Full path on disk
    pub path: PathBuf,
}

/// Directory that holds uploaded originals
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the upload directory, creating it if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write an upload under a collision-free name
    pub async fn save(&self, original_filename: &str, data: &[u8]) -> Result<StoredUpload> {
        let filename = format!("{}_{}", uuid::Uuid::new_v4(), stored_name(original_filename));
        let path = self.dir.join(&filename);

        tokio::fs::write(&path, data).await?;
        tracing::debug!("Stored upload {} ({} bytes)", path.display(), data.len());

        Ok(StoredUpload { filename, path })
    }

    /// Remove a stored file; a file that is already gone is not an error
    pub async fn remove(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Upload already missing: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Secure name that still carries the original extension, which ingestion
/// uses to pick a parser
fn stored_name(original_filename: &str) -> String {
    let secure = secure_filename(original_filename);
    let extension = Path::new(original_filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) if !secure.to_lowercase().ends_with(&format!(".{}", ext)) => {
            format!("{}.{}", secure, ext)
        }
        _ => secure,
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Path components are stripped, whitespace becomes `_`, and anything outside
/// `[A-Za-z0-9._-]` is dropped. Leading dots are removed so the result can't
/// name a hidden file or a parent directory.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = cleaned.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("report.pdf"), "report.pdf");
        assert_eq!(secure_filename("my notes v2.txt"), "my_notes_v2.txt");
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\thesis.pdf"), "thesis.pdf");
        assert_eq!(secure_filename(".hidden.txt"), "hidden.txt");
        assert_eq!(secure_filename("résumé.pdf"), "rsum.pdf");
        assert_eq!(secure_filename("../"), "upload");
    }

    #[test]
    fn test_stored_name_keeps_extension() {
        assert_eq!(stored_name("report.PDF"), "report.PDF");
        assert_eq!(stored_name("é.pdf"), "pdf.pdf");
        assert_eq!(stored_name("noext"), "noext");
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads")).unwrap();

        let first = store.save("notes.txt", b"hello").await.unwrap();
        let second = store.save("notes.txt", b"world").await.unwrap();

        assert!(first.filename.ends_with("_notes.txt"));
        assert_ne!(first.path, second.path);
        assert_eq!(std::fs::read(&first.path).unwrap(), b"hello");

        store.remove(&first.path).await.unwrap();
        assert!(!first.path.exists());
        // second removal is tolerated
        store.remove(&first.path).await.unwrap();
    }
}
