//! Prompt templates for summaries, answers and comparisons

use crate::types::{truncate_chars, Turn};

/// System message used when no documents are indexed
pub const ASSISTANT_PERSONA: &str = "You are a helpful research assistant. You can answer questions \
and have conversations, but you work best when provided with documents to analyze.";

/// Prompt builder for every LLM call the service makes
pub struct PromptBuilder;

impl PromptBuilder {
    /// Summary prompt over the first `input_chars` characters of a document
    pub fn summary(text: &str, input_chars: usize) -> String {
        let excerpt = truncate_chars(text, input_chars);
        let ellipsis = if excerpt.len() < text.len() { "..." } else { "" };

        format!(
            r#"Please provide a concise summary of the following document in about 2-3 sentences.
Focus on the main topics, key points, and overall purpose of the document.

Document text:
{excerpt}{ellipsis}

Summary:"#
        )
    }

    /// Rewrite a follow-up question so it stands alone without the chat history
    pub fn condense_question(history: &[Turn], question: &str) -> String {
        let chat_history = history
            .iter()
            .map(|t| format!("Human: {}\nAssistant: {}", t.question, t.answer))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{chat_history}
Follow Up Input: {question}
Standalone question:"#
        )
    }

    /// Answer from chunks retrieved out of a single document
    pub fn document_answer(chunks: &[&str], question: &str) -> String {
        let context = chunks.join("\n\n");

        format!(
            r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#
        )
    }

    /// Answer from chunks pooled across every indexed document
    pub fn cross_document_answer(history: &[Turn], context: &str, question: &str) -> String {
        format!(
            r#"Based on the following document context and conversation history, please answer the question.

Previous conversation:
{history}

Document context:
{context}

Question: {question}

Please provide a helpful and accurate answer based on the available information."#,
            history = Self::format_history(history),
        )
    }

    /// `Q:/A:` transcript of prior turns
    pub fn format_history(turns: &[Turn]) -> String {
        turns
            .iter()
            .map(|t| format!("Q: {}\nA: {}\n\n", t.question, t.answer))
            .collect()
    }

    /// Comparison prompt. `summaries` are `- name: summary` lines and
    /// `contents` are `Document: name\n<excerpt>` blocks.
    pub fn comparison(instruction: &str, summaries: &[String], contents: &[String]) -> String {
        format!(
            r#"Please {instruction} the following documents. Provide a detailed analysis with specific examples.

Document Summaries:
{summaries}

Full Content Analysis:
{contents}

Provide a comprehensive comparison covering:
1. Main points of comparison
2. Specific examples from each document
3. Key insights or conclusions"#,
            summaries = summaries.join("\n"),
            contents = contents.join("\n"),
        )
    }
}
