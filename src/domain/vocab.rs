// ============================================================
// Layer 3 — Vocabulary
// ============================================================
// Bidirectional mapping between characters and dense ids.
// Built once before training and never mutated afterwards.

use std::collections::HashMap;

use crate::error::ModelError;

/// The alphabet every corpus in this project is written in:
/// lowercase ASCII letters followed by the space character.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz ";

#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    chars:   Vec<char>,
    indices: HashMap<char, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from an ordered list of characters.
    /// Duplicates keep the id of their first occurrence.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let mut ordered = Vec::new();
        let mut indices = HashMap::new();
        for c in chars {
            if !indices.contains_key(&c) {
                indices.insert(c, ordered.len());
                ordered.push(c);
            }
        }
        Self { chars: ordered, indices }
    }

    /// The 27-symbol `a..z` + space alphabet.
    pub fn lowercase_with_space() -> Self {
        Self::from_chars(DEFAULT_ALPHABET.chars())
    }

    pub fn index_of(&self, c: char) -> Result<usize, ModelError> {
        self.indices
            .get(&c)
            .copied()
            .ok_or(ModelError::UnknownCharacter(c))
    }

    pub fn char_at(&self, index: usize) -> Result<char, ModelError> {
        self.chars.get(index).copied().ok_or(ModelError::InvalidIndex {
            index,
            vocab_size: self.chars.len(),
        })
    }

    /// Map every character of `text` to its id, failing on the first unknown one.
    pub fn encode(&self, text: &str) -> Result<Vec<usize>, ModelError> {
        text.chars().map(|c| self.index_of(c)).collect()
    }

    pub fn size(&self) -> usize {
        self.chars.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::lowercase_with_space()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alphabet_has_27_symbols() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.size(), 27);
        assert_eq!(vocab.index_of('a'), Ok(0));
        assert_eq!(vocab.index_of(' '), Ok(26));
        assert_eq!(vocab.char_at(25), Ok('z'));
    }

    #[test]
    fn test_unknown_character_is_rejected() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.index_of('Q'), Err(ModelError::UnknownCharacter('Q')));
        assert_eq!(
            vocab.encode("ab!"),
            Err(ModelError::UnknownCharacter('!'))
        );
    }

    #[test]
    fn test_char_at_out_of_range() {
        let vocab = Vocabulary::default();
        assert_eq!(
            vocab.char_at(27),
            Err(ModelError::InvalidIndex { index: 27, vocab_size: 27 })
        );
    }

    #[test]
    fn test_duplicates_keep_first_id() {
        let vocab = Vocabulary::from_chars("abca".chars());
        assert_eq!(vocab.size(), 3);
        assert_eq!(vocab.index_of('a'), Ok(0));
        assert_eq!(vocab.encode("cab"), Ok(vec![2, 0, 1]));
    }
}
