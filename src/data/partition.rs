// ============================================================
// Layer 4 — Epoch Partitioning
// ============================================================
// Each epoch visits the training set in a fresh order drawn
// from a caller-seeded RNG, then walks it in consecutive
// batches of `batch_size`. The last batch holds the remainder
// (n mod batch_size) when n is not a multiple of batch_size.
//
// The epoch loss is the mean of the per-batch losses, i.e. it
// is divided by the number of batches ceil(n / batch_size):
//
//   n = 10, batch_size = 4 → batches of 4, 4, 2 → divide by 3
//
// Uses Fisher-Yates via rand::seq::SliceRandom.

use std::ops::Range;

use rand::{rngs::StdRng, seq::SliceRandom};

use crate::error::ModelError;

/// A random permutation of `0..n`.
pub fn shuffled_order(n: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

/// Consecutive `[start, end)` ranges covering `0..n`.
pub fn batch_ranges(n: usize, batch_size: usize) -> Result<Vec<Range<usize>>, ModelError> {
    if batch_size == 0 {
        return Err(ModelError::EmptyBatch { batch_size });
    }
    Ok((0..n)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(n))
        .collect())
}

pub fn num_batches(n: usize, batch_size: usize) -> usize {
    n.div_ceil(batch_size.max(1))
}

/// `sum(batch_losses) / number_of_batches`; NaN for an empty epoch.
pub fn epoch_average_loss(batch_losses: &[f64]) -> f64 {
    if batch_losses.is_empty() {
        return f64::NAN;
    }
    batch_losses.iter().sum::<f64>() / batch_losses.len() as f64
}

/// Split `items` into runs of equal sequence length, in order of first appearance.
pub fn group_by_len<T>(items: Vec<T>, len_of: impl Fn(&T) -> usize) -> Vec<Vec<T>> {
    let mut groups: Vec<(usize, Vec<T>)> = Vec::new();
    for item in items {
        let len = len_of(&item);
        match groups.iter_mut().find(|(l, _)| *l == len) {
            Some((_, group)) => group.push(item),
            None             => groups.push((len, vec![item])),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}
