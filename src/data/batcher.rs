// ============================================================
// Layer 4 — Batchers
// ============================================================
// Implement Burn's Batcher trait to turn encoded items into
// tensors on the training device.
//
//   Input:  Vec of N items whose sequences all have length S
//   Output: Int tensors of shape [N, S] (plus labels / targets)
//
// Items must already share one sequence length; the trainer
// groups a mini-batch by length before calling `batch`, so
// contexts of different lengths never need padding.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::{ClassificationItem, LmItem};

fn flatten_ids<'a>(rows: impl Iterator<Item = &'a Vec<usize>>) -> Vec<i32> {
    rows.flat_map(|row| row.iter().map(|&id| id as i32)).collect()
}

/// A batch of equal-length contexts with their class ids.
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Character ids — shape: [batch_size, seq_len]
    pub contexts: Tensor<B, 2, Int>,
    /// Class ids — shape: [batch_size]
    pub labels:   Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ClassificationItem, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<ClassificationItem>) -> ClassificationBatch<B> {
        let batch_size = items.len();
        let seq_len    = items[0].ids.len();

        let ids_flat = flatten_ids(items.iter().map(|item| &item.ids));
        let labels: Vec<i32> = items.iter().map(|item| item.label as i32).collect();

        let contexts = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ClassificationBatch { contexts, labels }
    }
}

/// A batch of teacher-forced chunks.
#[derive(Debug, Clone)]
pub struct LmBatch<B: Backend> {
    /// Input character ids — shape: [batch_size, seq_len]
    pub inputs:  Tensor<B, 2, Int>,
    /// Next-character ids — shape: [batch_size, seq_len]
    pub targets: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct LmBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> LmBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<LmItem, LmBatch<B>> for LmBatcher<B> {
    fn batch(&self, items: Vec<LmItem>) -> LmBatch<B> {
        let batch_size = items.len();
        let seq_len    = items[0].input_ids.len();

        let inputs_flat  = flatten_ids(items.iter().map(|item| &item.input_ids));
        let targets_flat = flatten_ids(items.iter().map(|item| &item.target_ids));

        let inputs = Tensor::<B, 1, Int>::from_ints(inputs_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);
        let targets = Tensor::<B, 1, Int>::from_ints(targets_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        LmBatch { inputs, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_classification_batch_shapes() {
        let batcher = ClassificationBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![
            ClassificationItem { ids: vec![0, 1, 2], label: 0 },
            ClassificationItem { ids: vec![3, 4, 5], label: 1 },
        ]);
        assert_eq!(batch.contexts.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);
    }

    #[test]
    fn test_lm_batch_shapes() {
        let batcher = LmBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![LmItem {
            input_ids:  vec![26, 0, 1, 2],
            target_ids: vec![0, 1, 2, 3],
        }]);
        assert_eq!(batch.inputs.dims(), [1, 4]);
        assert_eq!(batch.targets.dims(), [1, 4]);
    }
}
