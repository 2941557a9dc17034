// ============================================================
// Layer 5 — Reference Models
// ============================================================
// Two models with no learned parameters, implementing the same
// capability traits as the recurrent models:
//
//   FrequencyBasedClassifier — counts which class each context's
//                              last character was seen with
//   UniformLanguageModel     — log(1/V) for every query
//
// Both are useful as lower bounds and as test oracles.

use std::collections::HashMap;

use crate::domain::{
    label::Label,
    traits::{ensure_context, ConsonantVowelClassifier, LanguageModel},
};
use crate::error::ModelError;

#[derive(Debug, Clone, Default)]
pub struct FrequencyBasedClassifier {
    consonant_counts: HashMap<char, usize>,
    vowel_counts:     HashMap<char, usize>,
}

impl FrequencyBasedClassifier {
    /// Count the last character of every context in each corpus.
    /// An empty context fails the whole count.
    pub fn train(consonant_examples: &[String], vowel_examples: &[String]) -> Result<Self, ModelError> {
        fn count_last_chars(examples: &[String]) -> Result<HashMap<char, usize>, ModelError> {
            let mut counts = HashMap::new();
            for (line, ex) in examples.iter().enumerate() {
                let last = ex.chars().last().ok_or_else(|| {
                    ModelError::DataShape(format!("example {} has an empty context", line + 1))
                })?;
                *counts.entry(last).or_insert(0) += 1;
            }
            Ok(counts)
        }

        Ok(Self {
            consonant_counts: count_last_chars(consonant_examples)?,
            vowel_counts:     count_last_chars(vowel_examples)?,
        })
    }

    pub fn consonant_count(&self, c: char) -> usize {
        self.consonant_counts.get(&c).copied().unwrap_or(0)
    }

    pub fn vowel_count(&self, c: char) -> usize {
        self.vowel_counts.get(&c).copied().unwrap_or(0)
    }
}

impl ConsonantVowelClassifier for FrequencyBasedClassifier {
    /// Strictly more consonant sightings → consonant; ties (including
    /// never-seen characters) → vowel.
    fn predict(&self, context: &str) -> Result<Label, ModelError> {
        let last = context
            .chars()
            .last()
            .ok_or_else(|| ModelError::DataShape("cannot classify an empty context".to_string()))?;

        if self.consonant_count(last) > self.vowel_count(last) {
            Ok(Label::ConsonantFollows)
        } else {
            Ok(Label::VowelFollows)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UniformLanguageModel {
    vocab_size: usize,
}

impl UniformLanguageModel {
    pub fn new(vocab_size: usize) -> Result<Self, ModelError> {
        if vocab_size == 0 {
            return Err(ModelError::DataShape("vocabulary must not be empty".to_string()));
        }
        Ok(Self { vocab_size })
    }

    fn log_prob(&self) -> f64 {
        (1.0 / self.vocab_size as f64).ln()
    }
}

impl LanguageModel for UniformLanguageModel {
    fn log_prob_single(&self, _next_char: char, context: &str) -> Result<f64, ModelError> {
        ensure_context(context)?;
        Ok(self.log_prob())
    }

    fn log_prob_sequence(&self, next_chars: &str, context: &str) -> Result<f64, ModelError> {
        ensure_context(context)?;
        Ok(self.log_prob() * next_chars.chars().count() as f64)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_majority_class_wins() {
        let clf = FrequencyBasedClassifier::train(&strings(&["aab", "xb", "qc"]), &strings(&["zzb"])).unwrap();
        assert_eq!(clf.consonant_count('b'), 2);
        assert_eq!(clf.vowel_count('b'), 1);
        assert_eq!(clf.predict("the b").unwrap(), Label::ConsonantFollows);
    }

    #[test]
    fn test_unseen_character_ties_to_vowel() {
        let clf = FrequencyBasedClassifier::train(&strings(&["aab", "xb", "qc"]), &strings(&["zzb"])).unwrap();
        assert_eq!(clf.predict("hello w").unwrap(), Label::VowelFollows);
    }

    #[test]
    fn test_equal_counts_tie_to_vowel() {
        let clf = FrequencyBasedClassifier::train(&strings(&["ab"]), &strings(&["cb"])).unwrap();
        assert_eq!(clf.predict("b").unwrap(), Label::VowelFollows);
    }

    #[test]
    fn test_empty_training_context_fails() {
        let result = FrequencyBasedClassifier::train(&strings(&["ab", ""]), &strings(&["cb"]));
        assert!(matches!(result, Err(ModelError::DataShape(_))));
        let result = FrequencyBasedClassifier::train(&strings(&["ab"]), &strings(&[""]));
        assert!(matches!(result, Err(ModelError::DataShape(_))));
    }

    #[test]
    fn test_frequency_rejects_empty_context() {
        let clf = FrequencyBasedClassifier::default();
        assert!(matches!(clf.predict(""), Err(ModelError::DataShape(_))));
    }

    #[test]
    fn test_uniform_single_is_exactly_log_one_over_v() {
        let lm       = UniformLanguageModel::new(27).unwrap();
        let expected = (1.0f64 / 27.0).ln();
        for (c, ctx) in [('a', "x"), (' ', "the cat"), ('z', "qqqqqqqqqq")] {
            assert_eq!(lm.log_prob_single(c, ctx).unwrap(), expected);
        }
    }

    #[test]
    fn test_uniform_chain_rule() {
        let lm      = UniformLanguageModel::new(27).unwrap();
        let context = "abc";
        let next    = "defg";

        let mut prefix = context.to_string();
        let mut summed = 0.0;
        for c in next.chars() {
            summed += lm.log_prob_single(c, &prefix).unwrap();
            prefix.push(c);
        }
        assert_relative_eq!(lm.log_prob_sequence(next, context).unwrap(), summed, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_rejects_empty_context() {
        let lm = UniformLanguageModel::new(27).unwrap();
        assert!(matches!(lm.log_prob_single('a', ""), Err(ModelError::DataShape(_))));
    }
}
