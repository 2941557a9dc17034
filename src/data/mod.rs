// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between text files on disk and tensor batches.
//
//   corpus files
//       │
//       ▼
//   CorpusLoader      → one context per line / whole LM text
//       │
//       ▼
//   CharChunker       → cuts LM text into teacher-forced chunks
//       │
//       ▼
//   *Dataset          → vocabulary-encoded items (Burn Dataset)
//       │
//       ▼
//   partition         → seeded shuffle + batch boundaries
//       │
//       ▼
//   *Batcher          → stacks equal-length items into tensors
//
// Any malformed item fails the whole run here, before training
// starts, rather than being silently skipped.

/// Reads corpus files from disk
pub mod loader;

/// Splits language-model text into fixed-length training chunks
pub mod chunker;

/// Implements Burn's Dataset trait for encoded examples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffling, batch boundaries and epoch-loss averaging
pub mod partition;
