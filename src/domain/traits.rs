// ============================================================
// Layer 3 — Capability Traits
// ============================================================
// Two independent capabilities instead of one base type with
// "not implemented" defaults:
//
//   ConsonantVowelClassifier — FrequencyBasedClassifier, RnnClassifier
//   LanguageModel            — UniformLanguageModel, RnnLanguageModel
//
// Implementations are read-only handles: nothing behind these
// traits may mutate model parameters.

use crate::domain::label::Label;
use crate::error::ModelError;

/// Anything that can decide whether a consonant or a vowel follows a context.
pub trait ConsonantVowelClassifier {
    fn predict(&self, context: &str) -> Result<Label, ModelError>;
}

/// Anything that can score characters following a context.
///
/// All log-probabilities are natural logs and are always finite:
/// an implementation that would produce `-inf` must return
/// `ModelError::NumericDomain` instead.
pub trait LanguageModel {
    /// `log P(next_char | context)`
    fn log_prob_single(&self, next_char: char, context: &str) -> Result<f64, ModelError>;

    /// `log P(next_chars[0], next_chars[1], ... | context)`, by the chain rule
    /// `sum_i log P(next_chars[i] | context + next_chars[..i])`.
    fn log_prob_sequence(&self, next_chars: &str, context: &str) -> Result<f64, ModelError>;
}

/// Scoring an empty context is ill-defined for every language model.
pub(crate) fn ensure_context(context: &str) -> Result<(), ModelError> {
    if context.is_empty() {
        return Err(ModelError::DataShape(
            "cannot score a continuation of an empty context".to_string(),
        ));
    }
    Ok(())
}
