// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, traits and algorithms for frame
// identification:
//   - NO Burn framework types
//   - NO file I/O
//
// Everything here is testable without a tensor backend.

// Annotated target instances and predictions
pub mod example;

// LU → candidate frames, LU → related LUs
pub mod lexicon;

// TP/FP/FN counting and precision/recall/F1
pub mod evaluation;

// Defined error kinds
pub mod errors;

// Core abstractions (traits) that other layers implement
pub mod traits;
