// ============================================================
// Layer 5 — Language Model Scorer
// ============================================================
// Read-only handle over a trained CharLanguageModel.
//
// log_prob_sequence never re-encodes a growing prefix. The
// context is encoded once, then each continuation character is
//   (a) scored against the current state by the LM head, and
//   (b) folded into the state with the encoder's cell step,
// so a k-character continuation costs k constant-size steps.

use burn::prelude::*;

use crate::domain::{
    traits::{ensure_context, LanguageModel},
    vocab::Vocabulary,
};
use crate::error::ModelError;
use crate::ml::language_model::CharLanguageModel;

#[derive(Debug)]
pub struct RnnLanguageModel<B: Backend> {
    model: CharLanguageModel<B>,
    vocab: Vocabulary,
}

impl<B: Backend> RnnLanguageModel<B> {
    pub fn new(model: CharLanguageModel<B>, vocab: Vocabulary) -> Self {
        Self { model, vocab }
    }

    pub fn model(&self) -> &CharLanguageModel<B> {
        &self.model
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Distribution over the next character after `context`.
    pub fn next_char_distribution(&self, context: &str) -> Result<Vec<f64>, ModelError> {
        ensure_context(context)?;
        let encoded = self.model.encoder.encode(&self.vocab.encode(context)?)?;
        self.model.next_char_distribution(&encoded.final_state)
    }
}

impl<B: Backend> LanguageModel for RnnLanguageModel<B> {
    fn log_prob_single(&self, next_char: char, context: &str) -> Result<f64, ModelError> {
        ensure_context(context)?;
        let ids     = self.vocab.encode(context)?;
        let next_id = self.vocab.index_of(next_char)?;
        let encoded = self.model.encoder.encode(&ids)?;
        self.model.log_prob_of(&encoded.final_state, next_id)
    }

    fn log_prob_sequence(&self, next_chars: &str, context: &str) -> Result<f64, ModelError> {
        ensure_context(context)?;
        let ids      = self.vocab.encode(context)?;
        let next_ids = self.vocab.encode(next_chars)?;

        let mut state = self.model.encoder.encode(&ids)?.final_state;
        let mut total = 0.0;
        for next_id in next_ids {
            let (log_prob, next_state) = self.model.transition(state, next_id)?;
            total += log_prob;
            state  = next_state;
        }
        Ok(total)
    }
}
