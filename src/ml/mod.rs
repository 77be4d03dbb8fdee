// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific code lives here.
//
//   encoder.rs    — stacked unidirectional LSTMs
//
//   query.rs      — resolves an Example against the frame
//                   lexicon and pretrained vectors into the
//                   ids the model consumes
//
//   model.rs      — the frame identifier:
//                   • token / POS embeddings + frozen pretrained
//                     vectors through a trainable projection
//                   • forward and backward sentence LSTMs
//                   • target LSTM pooling over target positions
//                   • LU (or summed sibling LUs) and LU-POS lookups
//                   • hidden layer, frame scores, log-softmax
//                     restricted to the candidate frames
//
//   trainer.rs    — one example per step, periodic dev
//                   evaluation, best-F1 checkpointing
//
//   inferencer.rs — loads a checkpoint and predicts frames
//
// Training runs on `TrainBackend` (autodiff); every evaluation
// pass goes through `model.valid()` onto `InferBackend`, where
// dropout is a no-op.

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;
#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

/// Stacked LSTM encoder
pub mod encoder;

/// Example → model input resolution
pub mod query;

/// BiLSTM frame identification model
pub mod model;

/// Per-example training loop with dev evaluation
pub mod trainer;

/// Checkpoint loading and frame prediction
pub mod inferencer;
