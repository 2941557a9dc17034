// ============================================================
// Layer 5 — Character Language Model
// ============================================================
// Sequence encoder → every per-step hidden state → distribution
// over the next character:
//
//   per-step hidden [batch, seq, d_hidden]
//     → Dropout → Linear(d_hidden, vocab) → logits [batch, seq, vocab]
//
// Distributions come from a log-softmax, so every character has
// strictly positive probability and the log never sees a zero.
// A non-finite log-probability is reported as NumericDomain
// instead of leaking -inf to the caller.

use burn::{
    data::dataloader::batcher::Batcher,
    nn::{loss::CrossEntropyLossConfig, Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation,
};

use crate::data::{batcher::LmBatcher, dataset::LmItem, partition::group_by_len};
use crate::error::ModelError;
use crate::ml::encoder::{RecurrentState, SequenceEncoder, SequenceEncoderConfig};

#[derive(Config, Debug)]
pub struct RnnLanguageModelConfig {
    pub encoder: SequenceEncoderConfig,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl RnnLanguageModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CharLanguageModel<B> {
        CharLanguageModel {
            encoder: self.encoder.init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            decoder: LinearConfig::new(self.encoder.d_hidden, self.encoder.vocab_size).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct CharLanguageModel<B: Backend> {
    pub encoder: SequenceEncoder<B>,
    pub dropout: Dropout,
    pub decoder: Linear<B>,
}

impl<B: Backend> CharLanguageModel<B> {
    /// inputs: [batch, seq_len] → next-character logits: [batch, seq_len, vocab]
    pub fn forward(&self, inputs: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let (per_step, _) = self.encoder.forward(inputs);
        self.decoder.forward(self.dropout.forward(per_step))
    }

    /// Log-distribution over the next character for every per-step state.
    pub fn per_step_log_probs(&self, per_step: Tensor<B, 3>) -> Tensor<B, 3> {
        activation::log_softmax(self.decoder.forward(per_step), 2)
    }

    /// Mean next-character cross-entropy over every position of every chunk.
    pub fn forward_loss(
        &self,
        batcher: &LmBatcher<B>,
        items:   Vec<LmItem>,
    ) -> Result<Tensor<B, 1>, ModelError> {
        let positions: usize = items.iter().map(|item| item.target_ids.len()).sum();
        let ce = CrossEntropyLossConfig::new().init(&batcher.device);

        group_by_len(items, |item| item.input_ids.len())
            .into_iter()
            .map(|group| {
                let batch = batcher.batch(group);
                let [batch_size, seq_len] = batch.inputs.dims();
                let weight = (batch_size * seq_len) as f64 / positions as f64;

                let vocab  = self.encoder.vocab_size;
                let logits = self.forward(batch.inputs).reshape([batch_size * seq_len, vocab]);
                let targets = batch.targets.reshape([batch_size * seq_len]);
                ce.forward(logits, targets) * weight
            })
            .reduce(|acc, loss| acc + loss)
            .ok_or(ModelError::EmptyBatch { batch_size: 0 })
    }

    /// Natural-log distribution over the next character given `state`.
    pub fn next_char_log_probs(&self, state: &RecurrentState<B>) -> Result<Vec<f64>, ModelError> {
        let logits = self.decoder.forward(state.hidden.clone());
        let values = activation::log_softmax(logits, 1)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(ModelError::tensor)?;
        Ok(values.into_iter().map(f64::from).collect())
    }

    /// Probability of every next character; sums to 1, every entry > 0.
    pub fn next_char_distribution(&self, state: &RecurrentState<B>) -> Result<Vec<f64>, ModelError> {
        let probs: Vec<f64> = self.next_char_log_probs(state)?.into_iter().map(f64::exp).collect();
        if let Some(index) = probs.iter().position(|p| !(*p > 0.0) || !p.is_finite()) {
            return Err(ModelError::NumericDomain(format!(
                "character id {index} has probability {}",
                probs[index]
            )));
        }
        Ok(probs)
    }

    /// `log P(next_id | state)`
    pub fn log_prob_of(&self, state: &RecurrentState<B>, next_id: usize) -> Result<f64, ModelError> {
        self.encoder.check_ids(&[next_id])?;
        let log_prob = self.next_char_log_probs(state)?[next_id];
        if !log_prob.is_finite() {
            return Err(ModelError::NumericDomain(format!(
                "log-probability of character id {next_id} is {log_prob}"
            )));
        }
        Ok(log_prob)
    }

    /// Score `next_id` against `state`, then fold it in:
    /// `(state, next) → (log P(next | state), state')`.
    pub fn transition(
        &self,
        state:   RecurrentState<B>,
        next_id: usize,
    ) -> Result<(f64, RecurrentState<B>), ModelError> {
        let log_prob = self.log_prob_of(&state, next_id)?;
        let next     = self.encoder.step(state, next_id)?;
        Ok((log_prob, next))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray;

    fn model() -> CharLanguageModel<TestBackend> {
        RnnLanguageModelConfig::new(SequenceEncoderConfig::new(27).with_d_hidden(16))
            .init(&Default::default())
    }

    #[test]
    fn test_distribution_is_normalised_and_positive() {
        let lm      = model();
        let encoded = lm.encoder.encode(&[19, 7, 4, 26]).unwrap();
        let probs   = lm.next_char_distribution(&encoded.final_state).unwrap();
        assert_eq!(probs.len(), 27);
        assert!(probs.iter().all(|&p| p > 0.0));
        assert_relative_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_per_step_head_matches_final_state_head() {
        let lm      = model();
        let encoded = lm.encoder.encode(&[0, 1, 2]).unwrap();
        let from_state = lm.next_char_log_probs(&encoded.final_state).unwrap();
        let per_step = lm
            .per_step_log_probs(encoded.per_step)
            .slice([0..1, 2..3, 0..27])
            .reshape([27])
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .unwrap();
        for (a, b) in from_state.iter().zip(&per_step) {
            assert_relative_eq!(*a, f64::from(*b), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_transition_rejects_out_of_range_id() {
        let lm      = model();
        let encoded = lm.encoder.encode(&[0]).unwrap();
        assert_eq!(
            lm.transition(encoded.final_state, 40).err(),
            Some(ModelError::InvalidIndex { index: 40, vocab_size: 27 })
        );
    }

    #[test]
    fn test_forward_loss_near_uniform_at_init() {
        type Train = Autodiff<NdArray>;
        let device  = Default::default();
        let lm      = RnnLanguageModelConfig::new(SequenceEncoderConfig::new(27)).init::<Train>(&device);
        let batcher = LmBatcher::<Train>::new(device);
        let loss = lm
            .forward_loss(
                &batcher,
                vec![
                    LmItem { input_ids: vec![26, 0, 1], target_ids: vec![0, 1, 2] },
                    LmItem { input_ids: vec![26], target_ids: vec![3] },
                ],
            )
            .unwrap();
        let value: f64 = loss.into_scalar().elem::<f64>();
        // An untrained model is close to uniform: ln(27) ≈ 3.3
        assert!(value > 2.0 && value < 5.0, "loss = {value}");
    }
}
