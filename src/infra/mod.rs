// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that belong to no single layer:
//
//   metrics.rs — per-epoch training metrics, their CSV sink and
//                the JSON run summary written next to it.
//
// The core never decides where metrics go; it hands values to
// this layer (and to tracing) and the caller picks the sink.

/// Training metrics records and CSV / JSON logger
pub mod metrics;
