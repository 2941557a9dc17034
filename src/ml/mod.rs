// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here; the domain layer never sees
// a tensor.
//
//   encoder.rs        — embedding table + LSTM cell; whole-sequence
//                       encoding and one-character state steps
//   classifier.rs     — final state → 2 class scores, predict()
//   language_model.rs — per-step state → next-character log-softmax,
//                       (state, char) → (log-prob, state') transition
//   scorer.rs         — read-only LanguageModel handle that scores
//                       continuations incrementally
//   baseline.rs       — frequency classifier, uniform language model
//   trainer.rs        — seeded mini-batch Adam training for both tasks
//   evaluation.rs     — accuracy, perplexity, normalization checks

pub mod encoder;

pub mod classifier;

pub mod language_model;

pub mod scorer;

pub mod baseline;

/// Mini-batch training loops with per-epoch evaluation
pub mod trainer;

pub mod evaluation;
