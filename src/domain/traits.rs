// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Seam between the layers:
//   - FrameIdentifier → anything that assigns a frame to a target
//
// The application layer evaluates through this trait; the neural
// inferencer is the implementation.

use crate::domain::evaluation::{evaluate_example, PrfCounts};
use crate::domain::example::{Example, Prediction};

// ─── FrameIdentifier ──────────────────────────────────────────────────────────
/// Anything that can pick a frame for every target position of an example.
pub trait FrameIdentifier {
    fn identify(&self, example: &Example) -> Prediction;

    /// Predict every example and score the predictions against gold.
    fn evaluate(&self, examples: &[Example]) -> Evaluation {
        let mut evaluation = Evaluation::default();
        for example in examples {
            let predicted = self.identify(example);
            let counts    = evaluate_example(&example.targets, &predicted);
            evaluation.corpus += counts;
            evaluation.per_example.push(counts);
            evaluation.predictions.push(predicted);
        }
        evaluation
    }
}

/// Predictions plus per-example and corpus-level counts.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub predictions: Vec<Prediction>,
    pub per_example: Vec<PrfCounts>,
    pub corpus:      PrfCounts,
}
