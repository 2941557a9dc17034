// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types and traits describing the problem:
// characters, labels, labelled contexts and the two model
// capabilities (classify a context, score a continuation).
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums and traits
//
// Both the frequency/uniform baselines and the recurrent models
// implement the traits below, so callers never need to know
// which variant they hold.

/// Fixed character alphabet and character ↔ id mapping
pub mod vocab;

/// Class labels and labelled contexts
pub mod label;

/// Capability traits implemented by every model variant
pub mod traits;
