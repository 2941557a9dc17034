// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Model-agnostic metrics computed through the capability traits,
// so baselines and trained models are measured the same way.

use serde::{Deserialize, Serialize};

use crate::domain::{
    label::LabeledExample,
    traits::{ConsonantVowelClassifier, LanguageModel},
    vocab::Vocabulary,
};
use crate::error::ModelError;

/// Fraction of examples whose predicted label matches; 0 for no examples.
pub fn accuracy<C>(classifier: &C, examples: &[LabeledExample]) -> Result<f64, ModelError>
where
    C: ConsonantVowelClassifier + ?Sized,
{
    if examples.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for ex in examples {
        if classifier.predict(&ex.context)? == ex.label {
            correct += 1;
        }
    }
    Ok(correct as f64 / examples.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LmEvaluation {
    pub log_prob:     f64,
    pub avg_log_prob: f64,
    pub perplexity:   f64,
}

/// Score all of `text` as a continuation of `context`.
pub fn evaluate_text<L>(lm: &L, text: &str, context: &str) -> Result<LmEvaluation, ModelError>
where
    L: LanguageModel + ?Sized,
{
    let len = text.chars().count();
    if len == 0 {
        return Err(ModelError::DataShape("cannot evaluate an empty text".to_string()));
    }
    let log_prob     = lm.log_prob_sequence(text, context)?;
    let avg_log_prob = log_prob / len as f64;
    Ok(LmEvaluation { log_prob, avg_log_prob, perplexity: (-avg_log_prob).exp() })
}

/// `sum_c exp(log P(c | context))` over the whole vocabulary; ≈ 1 for a proper model.
pub fn normalization_sum<L>(lm: &L, vocab: &Vocabulary, context: &str) -> Result<f64, ModelError>
where
    L: LanguageModel + ?Sized,
{
    vocab
        .chars()
        .iter()
        .map(|&c| lm.log_prob_single(c, context).map(f64::exp))
        .sum()
}

/// Absolute gap between `log_prob_sequence` and the sum of
/// `log_prob_single` over growing prefixes.
pub fn chain_rule_gap<L>(lm: &L, next_chars: &str, context: &str) -> Result<f64, ModelError>
where
    L: LanguageModel + ?Sized,
{
    let sequence   = lm.log_prob_sequence(next_chars, context)?;
    let mut prefix = context.to_string();
    let mut summed = 0.0;
    for c in next_chars.chars() {
        summed += lm.log_prob_single(c, &prefix)?;
        prefix.push(c);
    }
    Ok((sequence - summed).abs())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::Label;
    use crate::ml::baseline::{FrequencyBasedClassifier, UniformLanguageModel};
    use approx::assert_relative_eq;

    #[test]
    fn test_accuracy_counts_matches() {
        let clf = FrequencyBasedClassifier::train(&["xb".to_string()], &[]).unwrap();
        let examples = vec![
            LabeledExample::new("ab", Label::ConsonantFollows),
            LabeledExample::new("ac", Label::VowelFollows),
            LabeledExample::new("ad", Label::ConsonantFollows),
            LabeledExample::new("bb", Label::VowelFollows),
        ];
        assert_relative_eq!(accuracy(&clf, &examples).unwrap(), 0.5);
    }

    #[test]
    fn test_accuracy_of_nothing_is_zero() {
        let clf = FrequencyBasedClassifier::default();
        assert_eq!(accuracy(&clf, &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_uniform_perplexity_is_vocab_size() {
        let lm   = UniformLanguageModel::new(27).unwrap();
        let eval = evaluate_text(&lm, "some dev text", " ").unwrap();
        assert_relative_eq!(eval.perplexity, 27.0, epsilon = 1e-9);
        assert_relative_eq!(eval.log_prob, 13.0 * (1.0f64 / 27.0).ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_is_normalised() {
        let vocab = Vocabulary::default();
        let lm    = UniformLanguageModel::new(vocab.size()).unwrap();
        assert_relative_eq!(normalization_sum(&lm, &vocab, "abc").unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_chain_rule_gap_is_zero() {
        let lm = UniformLanguageModel::new(27).unwrap();
        assert!(chain_rule_gap(&lm, "hello", "say ").unwrap() < 1e-12);
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let lm = UniformLanguageModel::new(27).unwrap();
        assert!(matches!(evaluate_text(&lm, "", " "), Err(ModelError::DataShape(_))));
    }
}
