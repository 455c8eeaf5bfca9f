//! Overlapping text chunking on sentence and word boundaries

use unicode_segmentation::UnicodeSegmentation;

use crate::types::Chunk;

/// Text chunker with configurable size and overlap.
///
/// Sizes are counted in characters. Every emitted chunk is at most
/// `chunk_size` characters long.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters carried over from the end of the previous chunk
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. `overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split a document's text into indexed chunks
    pub fn split(&self, document_id: i64, text: &str) -> Vec<Chunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk::new(document_id, i as u32, content))
            .collect()
    }

    /// Split text into chunk strings
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in self.pieces(text) {
            let piece_len = piece.chars().count();

            if current_len + piece_len > self.chunk_size && !current.trim().is_empty() {
                push_trimmed(&mut chunks, &current);

                // Start the next chunk with the tail of this one, if it still leaves room
                let tail = self.overlap_tail(&current);
                let tail_len = tail.chars().count();
                if tail_len + piece_len <= self.chunk_size {
                    current = tail;
                    current_len = tail_len;
                } else {
                    current.clear();
                    current_len = 0;
                }
            }

            current.push_str(piece);
            current_len += piece_len;
        }

        push_trimmed(&mut chunks, &current);
        chunks
    }

    /// Break text into pieces no longer than `chunk_size`: sentences where
    /// possible, then words, then raw character runs.
    fn pieces<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut pieces = Vec::new();

        for sentence in text.split_sentence_bounds() {
            if sentence.chars().count() <= self.chunk_size {
                pieces.push(sentence);
                continue;
            }

            for word in sentence.split_word_bounds() {
                if word.chars().count() <= self.chunk_size {
                    pieces.push(word);
                } else {
                    pieces.extend(hard_split(word, self.chunk_size));
                }
            }
        }

        pieces
    }

    /// Last `overlap` characters of a chunk, advanced to a sentence or word start
    fn overlap_tail(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }

        let total = text.chars().count();
        if total <= self.overlap {
            return text.to_string();
        }

        let start = text
            .char_indices()
            .nth(total - self.overlap)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let tail = &text[start..];

        if let Some(pos) = tail.find(". ") {
            return tail[pos + 2..].to_string();
        }
        if let Some(pos) = tail.find(' ') {
            return tail[pos + 1..].to_string();
        }

        tail.to_string()
    }
}

fn push_trimmed(chunks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split on character boundaries into runs of at most `max_chars`
fn hard_split(text: &str, max_chars: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (i, _) in text.char_indices() {
        if count == max_chars {
            parts.push(&text[start..i]);
            start = i;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        (0..40)
            .map(|i| format!("Sentence number {} talks about soil carbon and crop yields.", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::new(1000, 200);
        let chunks = chunker.split(7, "  A short note.  ");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "A short note.");
        assert_eq!(chunks[0].document_id, 7);
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let chunker = TextChunker::new(1000, 200);
        assert!(chunker.split(1, "").is_empty());
        assert!(chunker.split(1, " \n\t ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let chunker = TextChunker::new(200, 50);
        let chunks = chunker.split_text(&sample_text());

        assert!(chunks.len() > 5);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 200, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn test_chunks_overlap() {
        let chunker = TextChunker::new(200, 80);
        let chunks = chunker.split_text(&sample_text());

        for pair in chunks.windows(2) {
            let next_start: String = pair[1].chars().take(20).collect();
            assert!(
                pair[0].contains(&next_start),
                "expected overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_no_overlap() {
        let chunker = TextChunker::new(120, 0);
        let text = sample_text();
        let chunks = chunker.split_text(&text);

        let rejoined: usize = chunks.iter().map(|c| c.split_whitespace().count()).sum();
        assert_eq!(rejoined, text.split_whitespace().count());
    }

    #[test]
    fn test_long_sentence_falls_back_to_words() {
        let chunker = TextChunker::new(50, 10);
        let sentence = "word ".repeat(60);
        let chunks = chunker.split_text(&sentence);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
            assert!(chunk.split(' ').all(|w| w == "word"));
        }
    }

    #[test]
    fn test_unbroken_text_is_hard_split() {
        let chunker = TextChunker::new(30, 5);
        let blob = "é".repeat(100);
        let chunks = chunker.split_text(&blob);

        assert!(chunks.len() >= 4);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30);
        }
    }

    #[test]
    fn test_chunk_indices_are_sequential() {
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.split(3, &sample_text());
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i as u32);
        }
    }

    #[test]
    fn test_overlap_clamped() {
        let chunker = TextChunker::new(10, 50);
        assert_eq!(chunker.overlap(), 9);
    }

    #[test]
    fn test_hard_split_char_boundaries() {
        assert_eq!(hard_split("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(hard_split("ééé", 2), vec!["éé", "é"]);
    }
}
