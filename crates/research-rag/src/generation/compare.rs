//! Multi-document comparison

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::ingestion::FileParser;
use crate::providers::{CompletionRequest, LlmProvider};
use crate::retrieval::IndexRegistry;
use crate::types::{truncate_chars, ComparisonMode, Document};

use super::prompt::PromptBuilder;

/// Compares two or more documents with one LLM call
pub struct DocumentComparator {
    llm: Arc<dyn LlmProvider>,
    registry: IndexRegistry,
    excerpt_chars: usize,
    max_tokens: u32,
}

impl DocumentComparator {
    pub fn new(llm: Arc<dyn LlmProvider>, registry: IndexRegistry, config: &RetrievalConfig) -> Self {
        Self {
            llm,
            registry,
            excerpt_chars: config.comparison_chars,
            max_tokens: config.comparison_max_tokens,
        }
    }

    pub async fn compare(&self, documents: &[Document], mode: ComparisonMode) -> Result<String> {
        if documents.len() < 2 {
            return Err(Error::validation("At least 2 documents required for comparison"));
        }

        let mut summaries = Vec::with_capacity(documents.len());
        let mut contents = Vec::with_capacity(documents.len());

        for doc in documents {
            summaries.push(format!(
                "- {}: {}",
                doc.original_filename,
                doc.summary.as_deref().unwrap_or("No summary available")
            ));

            match self.document_text(doc).await {
                Ok(text) => contents.push(format!(
                    "Document: {}\n{}",
                    doc.original_filename,
                    truncate_chars(&text, self.excerpt_chars)
                )),
                Err(e) => {
                    tracing::warn!(
                        "No text for document {} in comparison, using summary only: {}",
                        doc.id,
                        e
                    );
                }
            }
        }

        let prompt = PromptBuilder::comparison(mode.instruction(), &summaries, &contents);
        let comparison = self
            .llm
            .complete(&CompletionRequest::prompt(prompt).with_max_tokens(self.max_tokens))
            .await?;

        tracing::info!("Compared {} documents ({:?})", documents.len(), mode);
        Ok(comparison)
    }

    /// Indexed text, or a fresh extraction from the stored file
    async fn document_text(&self, doc: &Document) -> Result<String> {
        if let Some(text) = self.registry.text(doc.id) {
            return Ok(text);
        }

        let path = doc.file_path.clone();
        let parsed = tokio::task::spawn_blocking(move || FileParser::parse_path(&path))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;
        Ok(parsed.content)
    }
}

/// Question text recorded for a comparison exchange
pub fn comparison_question(documents: &[Document]) -> String {
    let names: Vec<&str> = documents.iter().map(|d| d.original_filename.as_str()).collect();
    format!("Compare documents: {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::FakeLlm;
    use crate::retrieval::DocumentIndex;
    use crate::types::{Chunk, FileType};
    use chrono::Utc;
    use std::path::PathBuf;

    fn document(id: i64, name: &str, path: PathBuf, summary: Option<&str>) -> Document {
        Document {
            id,
            filename: format!("x_{}", name),
            original_filename: name.to_string(),
            file_path: path,
            file_type: FileType::Txt,
            upload_time: Utc::now(),
            processed: summary.is_some(),
            summary: summary.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_compare_uses_registry_and_file_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let on_disk = tmp.path().join("x_b.txt");
        std::fs::write(&on_disk, "Bravo text from disk").unwrap();

        let registry = IndexRegistry::new();
        registry.insert(
            DocumentIndex::build(1, vec![Chunk::new(1, 0, "alpha")], vec![vec![1.0]]).unwrap(),
            format!("Alpha text {}", "a".repeat(3000)),
        );

        let llm = Arc::new(FakeLlm::new("They differ."));
        let comparator =
            DocumentComparator::new(llm.clone(), registry, &RetrievalConfig::default());

        let docs = vec![
            document(1, "a.txt", PathBuf::from("/nonexistent/x_a.txt"), Some("About alpha")),
            document(2, "b.txt", on_disk, None),
        ];
        let result = comparator.compare(&docs, ComparisonMode::Differences).await.unwrap();
        assert_eq!(result, "They differ.");

        let prompt = llm.last_prompt();
        assert!(prompt.starts_with("Please identify key differences"));
        assert!(prompt.contains("- a.txt: About alpha"));
        assert!(prompt.contains("- b.txt: No summary available"));
        assert!(prompt.contains("Document: b.txt\nBravo text from disk"));
        assert!(!prompt.contains(&"a".repeat(2000)));
        assert_eq!(llm.requests()[0].max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn test_compare_requires_two_documents() {
        let llm = Arc::new(FakeLlm::new("unused"));
        let comparator =
            DocumentComparator::new(llm.clone(), IndexRegistry::new(), &RetrievalConfig::default());

        let one = vec![document(1, "a.txt", PathBuf::from("a"), None)];
        assert!(matches!(
            comparator.compare(&one, ComparisonMode::Themes).await,
            Err(Error::Validation(_))
        ));
        assert!(llm.requests().is_empty());
    }

    #[test]
    fn test_comparison_question() {
        let docs = vec![
            document(1, "a.txt", PathBuf::new(), None),
            document(2, "b.pdf", PathBuf::new(), None),
        ];
        assert_eq!(comparison_question(&docs), "Compare documents: a.txt, b.pdf");
    }
}
