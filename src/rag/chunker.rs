//! Whitespace normalisation and greedy word-bounded chunking.
//!
//! Chunk length is a character budget: every word costs its length plus one
//! separator. A word longer than the budget is never split and lands in a chunk
//! of its own.

/// Default chunk budget used by ingestion.
pub const DEFAULT_MAX_LEN: usize = 800;

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `text` into ordered chunks whose accumulated word cost stays within `max_len`.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let cost = word.chars().count() + 1;
        if current_len + cost > max_len && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            current_len = 0;
        }
        current.push(word);
        current_len += cost;
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_len: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

impl TextChunker {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Clean then chunk.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk_text(&clean_text(text), self.max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(chunk: &str) -> usize {
        chunk.split(' ').map(|w| w.chars().count() + 1).sum()
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(clean_text("  a\n\n b\t\tc  "), "a b c");
        assert_eq!(clean_text("\n\t "), "");
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let text = "The cat sat on the mat. The dog ran in the park.";
        let chunks = TextChunker::new(800).chunk(text);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn test_flush_boundary_counts_separators() {
        // "aa" and "bb" cost 3 each; a budget of 6 fits both, 5 does not.
        assert_eq!(chunk_text("aa bb", 6), vec!["aa bb"]);
        assert_eq!(chunk_text("aa bb", 5), vec!["aa", "bb"]);
    }

    #[test]
    fn test_oversized_word_gets_own_chunk() {
        let chunks = chunk_text("a supercalifragilistic b", 5);
        assert_eq!(chunks, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_no_words_no_chunks() {
        assert!(chunk_text("", 10).is_empty());
        assert!(TextChunker::default().chunk(" \n ").is_empty());
    }

    #[test]
    fn test_chunks_respect_budget_and_preserve_words() {
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor";
        for max_len in [1, 4, 7, 12, 20, 200] {
            let chunks = chunk_text(text, max_len);
            for chunk in &chunks {
                assert!(!chunk.is_empty());
                assert!(cost(chunk) <= max_len || !chunk.contains(' '));
            }
            assert_eq!(chunks.join(" "), text);
        }
    }

    #[test]
    fn test_multibyte_words_counted_by_chars() {
        // Each word is 3 chars, cost 4; budget 8 fits two.
        assert_eq!(chunk_text("héé wöö ñaa", 8), vec!["héé wöö", "ñaa"]);
    }
}
