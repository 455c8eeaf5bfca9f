//! Answer orchestration across the three retrieval modes

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::{ChatMessage, CompletionRequest, EmbeddingProvider, LlmProvider};
use crate::retrieval::{IndexRegistry, IndexedDocument};
use crate::types::{recent_turns, truncate_chars, AnswerMode, Conversation};

use super::prompt::{PromptBuilder, ASSISTANT_PERSONA};

/// Characters of each retrieved chunk recorded as document-mode context
const CHUNK_CONTEXT_CHARS: usize = 200;
/// Characters of pooled context recorded in cross-document mode
const POOLED_CONTEXT_CHARS: usize = 500;

/// An answer and the context it was grounded on
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub answer: String,
    /// Empty in conversational mode
    pub context_used: String,
    pub mode: AnswerMode,
}

/// Picks a retrieval mode and produces an answer
pub struct QueryOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    registry: IndexRegistry,
    config: RetrievalConfig,
}

impl QueryOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        registry: IndexRegistry,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            llm,
            registry,
            config,
        }
    }

    /// Answer a question.
    ///
    /// `history` is the session's recent conversations, newest first.
    pub async fn ask(
        &self,
        question: &str,
        document_id: Option<i64>,
        history: &[Conversation],
    ) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::validation("Question is required"));
        }

        if let Some(indexed) = document_id.and_then(|id| self.registry.get(id)) {
            return self.ask_document(&indexed, question, history).await;
        }

        if !self.registry.is_empty() {
            if let Some(answer) = self.ask_cross_document(question, history).await? {
                return Ok(answer);
            }
        }

        self.ask_conversational(question, history).await
    }

    async fn ask_document(
        &self,
        indexed: &IndexedDocument,
        question: &str,
        history: &[Conversation],
    ) -> Result<Answer> {
        let turns = recent_turns(history, self.config.document_history);

        let standalone = if turns.is_empty() {
            question.to_string()
        } else {
            let condensed = self
                .llm
                .complete(&CompletionRequest::prompt(PromptBuilder::condense_question(
                    &turns, question,
                )))
                .await?;
            if condensed.trim().is_empty() {
                question.to_string()
            } else {
                condensed.trim().to_string()
            }
        };

        let embedding = self.embedder.embed(&standalone).await?;
        let hits = indexed.index.search(&embedding, self.config.document_top_k)?;

        let chunks: Vec<&str> = hits.iter().map(|h| h.chunk.content.as_str()).collect();
        let answer = self
            .llm
            .complete(&CompletionRequest::prompt(PromptBuilder::document_answer(
                &chunks,
                &standalone,
            )))
            .await?;

        let context_used = hits
            .iter()
            .map(|h| h.chunk.preview(CHUNK_CONTEXT_CHARS))
            .collect::<Vec<_>>()
            .join("\n");

        tracing::info!(
            "Answered from document {} using {} chunks",
            indexed.index.document_id(),
            hits.len()
        );

        Ok(Answer {
            answer,
            context_used,
            mode: AnswerMode::Document,
        })
    }

    /// `None` when no index returned any chunk
    async fn ask_cross_document(
        &self,
        question: &str,
        history: &[Conversation],
    ) -> Result<Option<Answer>> {
        let embedding = self.embedder.embed(question).await?;

        let mut pooled = Vec::new();
        for indexed in self.registry.snapshot() {
            let hits = indexed.index.search(&embedding, self.config.cross_document_top_k)?;
            pooled.extend(hits.into_iter().map(|h| h.chunk.content));
        }

        if pooled.is_empty() {
            return Ok(None);
        }

        pooled.truncate(self.config.max_context_chunks);
        let context = pooled.join("\n");
        let turns = recent_turns(history, self.config.cross_document_history);

        let answer = self
            .llm
            .complete(
                &CompletionRequest::prompt(PromptBuilder::cross_document_answer(
                    &turns, &context, question,
                ))
                .with_max_tokens(self.config.answer_max_tokens),
            )
            .await?;

        tracing::info!("Answered across documents using {} chunks", pooled.len());

        Ok(Some(Answer {
            answer,
            context_used: truncate_chars(&context, POOLED_CONTEXT_CHARS).to_string(),
            mode: AnswerMode::CrossDocument,
        }))
    }

    async fn ask_conversational(&self, question: &str, history: &[Conversation]) -> Result<Answer> {
        let mut messages = vec![ChatMessage::system(ASSISTANT_PERSONA)];
        for turn in recent_turns(history, self.config.conversation_history) {
            messages.push(ChatMessage::user(turn.question));
            messages.push(ChatMessage::assistant(turn.answer));
        }
        messages.push(ChatMessage::user(question));

        let answer = self
            .llm
            .complete(&CompletionRequest::new(messages).with_max_tokens(self.config.answer_max_tokens))
            .await?;

        Ok(Answer {
            answer,
            context_used: String::new(),
            mode: AnswerMode::Conversational,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::{FakeEmbedder, FakeLlm};
    use crate::providers::Role;
    use crate::retrieval::DocumentIndex;
    use crate::types::Chunk;
    use chrono::Utc;

    fn index_text(registry: &IndexRegistry, id: i64, chunks: &[&str]) {
        let chunks: Vec<Chunk> = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| Chunk::new(id, i as u32, *c))
            .collect();
        let embeddings = chunks.iter().map(|c| FakeEmbedder::vector(&c.content)).collect();
        registry.insert(DocumentIndex::build(id, chunks, embeddings).unwrap(), String::new());
    }

    fn history(n: usize) -> Vec<Conversation> {
        // newest first
        (0..n)
            .rev()
            .map(|i| Conversation {
                id: i as i64,
                session_id: "s".into(),
                document_id: None,
                question: format!("question {}", i),
                answer: format!("answer {}", i),
                timestamp: Utc::now(),
                context_used: None,
            })
            .collect()
    }

    fn orchestrator(registry: &IndexRegistry, llm: Arc<FakeLlm>) -> QueryOrchestrator {
        QueryOrchestrator::new(
            Arc::new(FakeEmbedder::new()),
            llm,
            registry.clone(),
            RetrievalConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_conversational_without_documents() {
        let registry = IndexRegistry::new();
        let llm = Arc::new(FakeLlm::new("Hello there"));
        let answer = orchestrator(&registry, llm.clone())
            .ask("Hi", None, &history(7))
            .await
            .unwrap();

        assert_eq!(answer.mode, AnswerMode::Conversational);
        assert_eq!(answer.answer, "Hello there");
        assert!(answer.context_used.is_empty());

        let request = &llm.requests()[0];
        assert_eq!(request.max_tokens, Some(500));
        assert_eq!(request.messages[0].role, Role::System);
        // persona + 5 turns * 2 + question
        assert_eq!(request.messages.len(), 12);
        assert_eq!(request.messages[1].content, "question 2");
        assert_eq!(request.messages[10].content, "answer 6");
        assert_eq!(request.messages[11].content, "Hi");
    }

    #[tokio::test]
    async fn test_document_mode_uses_named_index() {
        let registry = IndexRegistry::new();
        index_text(&registry, 1, &["soil carbon storage in grasslands", "unrelated weather notes"]);
        index_text(&registry, 2, &["medieval castle architecture"]);

        let llm = Arc::new(FakeLlm::new("Grasslands store carbon."));
        let answer = orchestrator(&registry, llm.clone())
            .ask("How is soil carbon stored?", Some(1), &[])
            .await
            .unwrap();

        assert_eq!(answer.mode, AnswerMode::Document);
        assert!(answer.context_used.starts_with("soil carbon storage in grasslands..."));
        assert!(!answer.context_used.contains("castle"));

        // no history, so no condensation call
        assert_eq!(llm.requests().len(), 1);
        assert!(llm.last_prompt().contains("Question: How is soil carbon stored?"));
    }

    #[tokio::test]
    async fn test_document_mode_condenses_follow_up() {
        let registry = IndexRegistry::new();
        index_text(&registry, 1, &["soil carbon storage"]);

        let llm = Arc::new(FakeLlm::new("What about soil carbon?"));
        orchestrator(&registry, llm.clone())
            .ask("And then?", Some(1), &history(2))
            .await
            .unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        let condense = &requests[0].messages[0].content;
        assert!(condense.contains("Follow Up Input: And then?"));
        assert!(condense.find("question 0").unwrap() < condense.find("question 1").unwrap());
        // answer prompt uses the standalone question
        assert!(requests[1].messages[0].content.contains("Question: What about soil carbon?"));
    }

    #[tokio::test]
    async fn test_cross_document_when_no_id() {
        let registry = IndexRegistry::new();
        for id in 1..=4 {
            index_text(&registry, id, &["alpha beta", "gamma delta", "epsilon"]);
        }

        let llm = Arc::new(FakeLlm::new("Pooled answer"));
        let answer = orchestrator(&registry, llm.clone())
            .ask("alpha?", None, &history(4))
            .await
            .unwrap();

        assert_eq!(answer.mode, AnswerMode::CrossDocument);
        assert!(!answer.context_used.is_empty());
        assert!(answer.context_used.chars().count() <= 500);

        let prompt = llm.last_prompt();
        // 4 documents * 2 hits, capped at 5 chunks
        assert_eq!(prompt.matches("alpha beta").count() + prompt.matches("gamma delta").count() + prompt.matches("epsilon").count(), 5);
        // only the 3 most recent turns
        assert!(!prompt.contains("question 0"));
        assert!(prompt.contains("Q: question 1"));
        assert!(prompt.contains("Q: question 3"));
        assert_eq!(llm.requests()[0].max_tokens, Some(500));
    }

    #[tokio::test]
    async fn test_unknown_document_falls_back_to_cross_document() {
        let registry = IndexRegistry::new();
        index_text(&registry, 1, &["some text"]);

        let llm = Arc::new(FakeLlm::new("ok"));
        let answer = orchestrator(&registry, llm)
            .ask("text?", Some(99), &[])
            .await
            .unwrap();
        assert_eq!(answer.mode, AnswerMode::CrossDocument);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let registry = IndexRegistry::new();
        let llm = Arc::new(FakeLlm::new("unused"));
        let result = orchestrator(&registry, llm.clone()).ask("  ", None, &[]).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let registry = IndexRegistry::new();
        let result = orchestrator(&registry, Arc::new(FakeLlm::failing()))
            .ask("Hi", None, &[])
            .await;
        assert!(matches!(result, Err(Error::Llm(_))));
    }
}
