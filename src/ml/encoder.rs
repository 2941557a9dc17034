// ============================================================
// Layer 5 — Sequence Encoder
// ============================================================
// Embedding table + LSTM cell shared by both tasks.
//
//   ids [batch, seq] ──Embedding──► [batch, seq, d_emb]
//                     ──LSTM──────► per-step hidden [batch, seq, d_hidden]
//                                   final (hidden, cell) [batch, d_hidden]
//
// The embedding table is shared across all positions, and the
// same cell transition is used by `encode` (whole sequence) and
// `step` (one more character folded into an existing state), so
// a state extended by `step` is the state `encode` would have
// produced for the longer sequence.

use burn::{
    nn::{Embedding, EmbeddingConfig, Lstm, LstmConfig, LstmState},
    prelude::*,
};

use crate::error::ModelError;

#[derive(Config, Debug)]
pub struct SequenceEncoderConfig {
    pub vocab_size: usize,
    #[config(default = 30)]
    pub d_emb:      usize,
    #[config(default = 32)]
    pub d_hidden:   usize,
}

impl SequenceEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SequenceEncoder<B> {
        SequenceEncoder {
            embedding:  EmbeddingConfig::new(self.vocab_size, self.d_emb).init(device),
            lstm:       LstmConfig::new(self.d_emb, self.d_hidden, true).init(device),
            vocab_size: self.vocab_size,
            d_hidden:   self.d_hidden,
        }
    }
}

#[derive(Module, Debug)]
pub struct SequenceEncoder<B: Backend> {
    pub embedding:  Embedding<B>,
    pub lstm:       Lstm<B>,
    pub vocab_size: usize,
    pub d_hidden:   usize,
}

/// Summary of a prefix: LSTM hidden and cell vectors, each [batch, d_hidden].
#[derive(Debug, Clone)]
pub struct RecurrentState<B: Backend> {
    pub hidden: Tensor<B, 2>,
    pub cell:   Tensor<B, 2>,
}

impl<B: Backend> RecurrentState<B> {
    fn from_lstm(state: LstmState<B, 2>) -> Self {
        Self { hidden: state.hidden, cell: state.cell }
    }

    fn into_lstm(self) -> LstmState<B, 2> {
        LstmState::new(self.cell, self.hidden)
    }
}

/// Result of encoding one sequence.
#[derive(Debug, Clone)]
pub struct EncodedSequence<B: Backend> {
    pub final_state: RecurrentState<B>,
    /// Hidden state after every character — shape: [1, seq_len, d_hidden]
    pub per_step:    Tensor<B, 3>,
}

impl<B: Backend> SequenceEncoder<B> {
    /// Batched forward pass used by training.
    pub fn forward(&self, ids: Tensor<B, 2, Int>) -> (Tensor<B, 3>, RecurrentState<B>) {
        self.forward_from(ids, None)
    }

    /// Continue encoding from `state` (or from zeros when `None`).
    pub fn forward_from(
        &self,
        ids:   Tensor<B, 2, Int>,
        state: Option<RecurrentState<B>>,
    ) -> (Tensor<B, 3>, RecurrentState<B>) {
        let embedded = self.embedding.forward(ids);
        let (per_step, state) = self.lstm.forward(embedded, state.map(RecurrentState::into_lstm));
        (per_step, RecurrentState::from_lstm(state))
    }

    /// Encode one non-empty sequence of character ids.
    pub fn encode(&self, ids: &[usize]) -> Result<EncodedSequence<B>, ModelError> {
        if ids.is_empty() {
            return Err(ModelError::DataShape("cannot encode an empty context".to_string()));
        }
        let input = self.ids_tensor(ids)?;
        let (per_step, final_state) = self.forward(input);
        Ok(EncodedSequence { final_state, per_step })
    }

    /// Fold one more character into `state`.
    pub fn step(&self, state: RecurrentState<B>, id: usize) -> Result<RecurrentState<B>, ModelError> {
        let input = self.ids_tensor(&[id])?;
        let (_, next) = self.forward_from(input, Some(state));
        Ok(next)
    }

    pub fn check_ids(&self, ids: &[usize]) -> Result<(), ModelError> {
        match ids.iter().find(|&&id| id >= self.vocab_size) {
            Some(&index) => Err(ModelError::InvalidIndex { index, vocab_size: self.vocab_size }),
            None         => Ok(()),
        }
    }

    fn ids_tensor(&self, ids: &[usize]) -> Result<Tensor<B, 2, Int>, ModelError> {
        self.check_ids(ids)?;
        let device = self.embedding.weight.val().device();
        let flat: Vec<i32> = ids.iter().map(|&id| id as i32).collect();
        Ok(Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &device).reshape([1, ids.len()]))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn encoder() -> SequenceEncoder<TestBackend> {
        SequenceEncoderConfig::new(27)
            .with_d_emb(8)
            .with_d_hidden(12)
            .init(&Default::default())
    }

    fn to_vec(t: Tensor<TestBackend, 2>) -> Vec<f32> {
        t.into_data().convert::<f32>().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_encode_shapes() {
        let enc     = encoder();
        let encoded = enc.encode(&[0, 1, 2, 26]).unwrap();
        assert_eq!(encoded.per_step.dims(), [1, 4, 12]);
        assert_eq!(encoded.final_state.hidden.dims(), [1, 12]);
        assert_eq!(encoded.final_state.cell.dims(), [1, 12]);
    }

    #[test]
    fn test_final_state_is_last_step() {
        let enc     = encoder();
        let encoded = enc.encode(&[3, 4, 5]).unwrap();
        let last    = encoded.per_step.slice([0..1, 2..3, 0..12]).reshape([1, 12]);
        let a = to_vec(last);
        let b = to_vec(encoded.final_state.hidden);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_step_matches_full_encoding() {
        let enc  = encoder();
        let full = enc.encode(&[7, 8, 9, 10]).unwrap();
        let head = enc.encode(&[7, 8]).unwrap();
        let state = enc.step(head.final_state, 9).unwrap();
        let state = enc.step(state, 10).unwrap();

        let a = to_vec(full.final_state.hidden);
        let b = to_vec(state.hidden);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-5);
        }
        let a = to_vec(full.final_state.cell);
        let b = to_vec(state.cell);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let enc = encoder();
        let a = to_vec(enc.encode(&[1, 2, 3]).unwrap().final_state.hidden);
        let b = to_vec(enc.encode(&[1, 2, 3]).unwrap().final_state.hidden);
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_range_id_is_rejected() {
        let enc = encoder();
        assert_eq!(
            enc.encode(&[0, 27]).err(),
            Some(ModelError::InvalidIndex { index: 27, vocab_size: 27 })
        );
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let enc = encoder();
        assert!(matches!(enc.encode(&[]), Err(ModelError::DataShape(_))));
    }
}
