// ============================================================
// Layer 5 — Consonant/Vowel Classifier
// ============================================================
// Sequence encoder → final hidden state → 2-way class scores:
//
//   final hidden [batch, d_hidden]
//     → Linear(d_hidden, d_head) → ReLU → Dropout
//     → Linear(d_head, 2)        → scores [batch, 2]
//
// Dropout only fires on an autodiff backend, so the model
// returned by `valid()` scores deterministically.

use burn::{
    data::dataloader::batcher::Batcher,
    nn::{loss::CrossEntropyLossConfig, Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation,
};

use crate::data::{
    batcher::ClassificationBatcher,
    dataset::ClassificationItem,
    partition::group_by_len,
};
use crate::domain::{label::Label, traits::ConsonantVowelClassifier, vocab::Vocabulary};
use crate::error::ModelError;
use crate::ml::encoder::{RecurrentState, SequenceEncoder, SequenceEncoderConfig};

#[derive(Config, Debug)]
pub struct RnnClassifierConfig {
    pub encoder: SequenceEncoderConfig,
    #[config(default = 16)]
    pub d_head:  usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl RnnClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RnnClassifierModel<B> {
        RnnClassifierModel {
            encoder: self.encoder.init(device),
            hidden:  LinearConfig::new(self.encoder.d_hidden, self.d_head).init(device),
            output:  LinearConfig::new(self.d_head, Label::ALL.len()).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct RnnClassifierModel<B: Backend> {
    pub encoder: SequenceEncoder<B>,
    pub hidden:  Linear<B>,
    pub output:  Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> RnnClassifierModel<B> {
    /// contexts: [batch, seq_len] → class scores: [batch, 2]
    pub fn forward(&self, contexts: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let (_, state) = self.encoder.forward(contexts);
        self.classify(&state)
    }

    /// Unnormalised scores for each class from a final recurrent state.
    pub fn classify(&self, state: &RecurrentState<B>) -> Tensor<B, 2> {
        let x = activation::relu(self.hidden.forward(state.hidden.clone()));
        self.output.forward(self.dropout.forward(x))
    }

    /// Mean cross-entropy over a mini-batch.
    ///
    /// Items are grouped by context length and each group's mean
    /// loss is weighted by its share of the batch, which equals
    /// the mean over all items taken one by one.
    pub fn forward_loss(
        &self,
        batcher: &ClassificationBatcher<B>,
        items:   Vec<ClassificationItem>,
    ) -> Result<Tensor<B, 1>, ModelError> {
        let total = items.len();
        let ce    = CrossEntropyLossConfig::new().init(&batcher.device);

        group_by_len(items, |item| item.ids.len())
            .into_iter()
            .map(|group| {
                let weight = group.len() as f64 / total as f64;
                let batch  = batcher.batch(group);
                ce.forward(self.forward(batch.contexts), batch.labels) * weight
            })
            .reduce(|acc, loss| acc + loss)
            .ok_or(ModelError::EmptyBatch { batch_size: total })
    }

    pub fn class_scores(&self, ids: &[usize]) -> Result<[f32; 2], ModelError> {
        let encoded = self.encoder.encode(ids)?;
        let scores  = self
            .classify(&encoded.final_state)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(ModelError::tensor)?;
        match scores.as_slice() {
            [consonant, vowel] => Ok([*consonant, *vowel]),
            other => Err(ModelError::DataShape(format!(
                "expected 2 class scores, got {}",
                other.len()
            ))),
        }
    }

    /// Arg-max class; exact ties go to `ConsonantFollows`.
    pub fn predict_ids(&self, ids: &[usize]) -> Result<Label, ModelError> {
        Ok(Label::from_scores(self.class_scores(ids)?))
    }
}

/// Read-only handle over a trained classifier.
#[derive(Debug)]
pub struct RnnClassifier<B: Backend> {
    model: RnnClassifierModel<B>,
    vocab: Vocabulary,
}

impl<B: Backend> RnnClassifier<B> {
    pub fn new(model: RnnClassifierModel<B>, vocab: Vocabulary) -> Self {
        Self { model, vocab }
    }

    pub fn model(&self) -> &RnnClassifierModel<B> {
        &self.model
    }
}

impl<B: Backend> ConsonantVowelClassifier for RnnClassifier<B> {
    fn predict(&self, context: &str) -> Result<Label, ModelError> {
        let ids = self.vocab.encode(context)?;
        self.model.predict_ids(&ids)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray;

    fn classifier() -> RnnClassifier<TestBackend> {
        let vocab = Vocabulary::default();
        let model = RnnClassifierConfig::new(SequenceEncoderConfig::new(vocab.size()))
            .init::<TestBackend>(&Default::default());
        RnnClassifier::new(model, vocab)
    }

    #[test]
    fn test_predict_returns_one_of_two_labels() {
        let clf = classifier();
        for context in ["the quick brown fox ", "jumps over the lazy", "a"] {
            let label = clf.predict(context).unwrap();
            assert!(Label::ALL.contains(&label));
        }
    }

    #[test]
    fn test_predict_is_deterministic_without_autodiff() {
        let clf = classifier();
        let a = clf.model().class_scores(&[0, 1, 2, 3]).unwrap();
        let b = clf.model().class_scores(&[0, 1, 2, 3]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_rejects_unknown_characters() {
        let clf = classifier();
        assert_eq!(clf.predict("abC").err(), Some(ModelError::UnknownCharacter('C')));
    }

    #[test]
    fn test_predict_rejects_empty_context() {
        let clf = classifier();
        assert!(matches!(clf.predict(""), Err(ModelError::DataShape(_))));
    }

    #[test]
    fn test_mixed_length_batch_loss_is_finite() {
        type Train = Autodiff<NdArray>;
        let device  = Default::default();
        let model   = RnnClassifierConfig::new(SequenceEncoderConfig::new(27)).init::<Train>(&device);
        let batcher = ClassificationBatcher::<Train>::new(device);
        let loss = model
            .forward_loss(
                &batcher,
                vec![
                    ClassificationItem { ids: vec![0, 1, 2], label: 0 },
                    ClassificationItem { ids: vec![3, 4], label: 1 },
                    ClassificationItem { ids: vec![5, 6, 7], label: 1 },
                ],
            )
            .unwrap();
        let value: f64 = loss.into_scalar().elem::<f64>();
        assert!(value.is_finite() && value > 0.0);
    }
}
