use crate::core::error::SiftError;

pub const DEFAULT_CHUNK_SIZE: usize = 20_000;

/// Splits source text into ordered, fixed-size slices.
///
/// Chunks partition the input exactly: no gaps, no overlaps, original order
/// preserved when concatenated. Boundaries are measured in characters, never
/// bytes, so multi-byte input is never split mid-code-point.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize) -> Result<Self, SiftError> {
        if chunk_size == 0 {
            return Err(SiftError::InvalidChunkSize);
        }
        Ok(Self { chunk_size })
    }

    /// Split `text` into chunks of at most `chunk_size` characters.
    /// Empty input yields an empty sequence.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.chunk_size)
            .map(|slice| slice.iter().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_chunk_size() {
        assert!(matches!(Chunker::new(0), Err(SiftError::InvalidChunkSize)));
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = Chunker::new(10).unwrap();
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn concatenation_reproduces_input() {
        let chunker = Chunker::new(7).unwrap();
        let text = "The quick brown fox jumps over the lazy dog";
        let chunks = chunker.split(text);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn chunk_count_is_ceil_of_length_over_size() {
        let chunker = Chunker::new(10).unwrap();
        for (len, expected) in [(1usize, 1usize), (9, 1), (10, 1), (11, 2), (45, 5), (100, 10)] {
            let text = "x".repeat(len);
            assert_eq!(chunker.split(&text).len(), expected, "len={}", len);
        }
    }

    #[test]
    fn every_chunk_except_last_is_full_size() {
        let chunker = Chunker::new(10).unwrap();
        let text = "a".repeat(45);
        let chunks = chunker.split(&text);
        assert_eq!(chunks.len(), 5);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.chars().count(), 10);
        }
        assert_eq!(chunks.last().unwrap().chars().count(), 5);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let chunker = Chunker::new(3).unwrap();
        let text = "héllo wörld ünïcode";
        let chunks = chunker.split(text);
        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 3);
        }
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let chunker = Chunker::new(5).unwrap();
        let chunks = chunker.split(&"y".repeat(20));
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.chars().count() == 5));
    }
}
