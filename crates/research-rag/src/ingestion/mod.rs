//! Document ingestion: parse, chunk, embed, index, summarise

mod chunker;
mod parser;
mod processor;

pub use chunker::TextChunker;
pub use parser::{cleanup_pdf_text, FileParser, ParsedDocument};
#[cfg(test)]
pub(crate) use parser::sample_pdf;
pub use processor::{IngestOutcome, IngestPipeline, SUMMARY_FAILED};
