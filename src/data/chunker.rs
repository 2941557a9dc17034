// ============================================================
// Layer 4 — Character Chunker
// ============================================================
// Cuts language-model training text into non-overlapping
// windows of `chunk_len` characters and turns each window into
// a teacher-forced (input, target) pair:
//
//   text:    "the cat sat"   chunk_len = 4, start = ' '
//   chunks:  "the " "cat " "sat"
//   input:   " the"  " cat"  " sa"
//   target:  "the "  "cat "  "sat"
//
// Position t of the input is the true character preceding
// target position t, so the model always sees real context,
// never its own predictions.

use crate::error::ModelError;

/// Symbol fed before the first character of every chunk, and the
/// context used to score text from its very beginning.
pub const START_SYMBOL: char = ' ';

#[derive(Debug, Clone, PartialEq)]
pub struct LmExample {
    pub input:  String,
    pub target: String,
}

pub struct CharChunker {
    chunk_len: usize,
    start:     char,
}

impl CharChunker {
    /// `start` is the symbol fed before the first character of every chunk.
    pub fn new(chunk_len: usize, start: char) -> Result<Self, ModelError> {
        if chunk_len == 0 {
            return Err(ModelError::DataShape("chunk length must be positive".to_string()));
        }
        Ok(Self { chunk_len, start })
    }

    /// Split `text` into windows; the final window may be shorter.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.chunk_len)
            .map(|window| window.iter().collect())
            .collect()
    }

    pub fn examples(&self, text: &str) -> Vec<LmExample> {
        self.chunk(text)
            .into_iter()
            .map(|target| {
                let mut input = String::with_capacity(target.len());
                input.push(self.start);
                let keep = target.chars().count() - 1;
                input.extend(target.chars().take(keep));
                LmExample { input, target }
            })
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_are_non_overlapping() {
        let chunker = CharChunker::new(4, ' ').unwrap();
        assert_eq!(chunker.chunk("the cat sat"), vec!["the ", "cat ", "sat"]);
    }

    #[test]
    fn test_examples_shift_by_one() {
        let chunker  = CharChunker::new(4, ' ').unwrap();
        let examples = chunker.examples("the cat sat");
        assert_eq!(examples.len(), 3);
        assert_eq!(examples[0].input, " the");
        assert_eq!(examples[0].target, "the ");
        assert_eq!(examples[2].input, " sa");
        assert_eq!(examples[2].target, "sat");
    }

    #[test]
    fn test_empty_text_gives_no_examples() {
        let chunker = CharChunker::new(4, ' ').unwrap();
        assert!(chunker.examples("").is_empty());
    }

    #[test]
    fn test_zero_chunk_len_is_rejected() {
        assert!(matches!(
            CharChunker::new(0, ' '),
            Err(ModelError::DataShape(_))
        ));
    }
}
