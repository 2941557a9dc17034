// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one task end to end:
//
//   classify — consonant/vowel classification (frequency or RNN)
//   lm       — character language modelling (uniform or RNN)
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination and backend selection

use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};

/// Consonant/vowel classification workflow
pub mod classify_use_case;

/// Language-model training and evaluation workflow
pub mod lm_use_case;

/// Training runs on the CPU ndarray backend with autodiff;
/// trained models come back on plain `NdArray`.
pub(crate) type TrainBackend = Autodiff<NdArray>;

pub(crate) fn device() -> NdArrayDevice {
    NdArrayDevice::default()
}
