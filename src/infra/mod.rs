// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting file concerns shared by the training and
// evaluation workflows:
//
//   atomic.rs       — write-temp-then-rename for every artifact
//                     a crash must not leave half-written
//
//   checkpoint.rs   — model parameters (burn named MessagePack
//                     recorder), model_config.json, and the
//                     best-dev-F1 history
//
//   metrics.rs      — one CSV row per dev evaluation
//
//   analysis_log.rs — per-sentence gold vs predicted dump
//                     written during test runs

/// Atomic whole-file writes
pub mod atomic;

/// Model checkpoint, config and best-F1 persistence
pub mod checkpoint;

/// Dev-evaluation metrics CSV logger
pub mod metrics;

/// Test-mode prediction analysis log
pub mod analysis_log;
