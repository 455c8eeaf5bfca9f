//! LLM-backed answering, summarisation prompts and comparison

pub mod compare;
pub mod orchestrator;
pub mod prompt;

pub use compare::{comparison_question, DocumentComparator};
pub use orchestrator::{Answer, QueryOrchestrator};
pub use prompt::{PromptBuilder, ASSISTANT_PERSONA};
