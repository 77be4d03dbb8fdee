// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Frames for unannotated input: the raw CoNLL file marks target
// tokens with an LU and leaves the frame column as `_`. The
// output is the same file with predicted frames filled in.

use std::path::PathBuf;

use anyhow::Result;
use burn::prelude::*;

use crate::application::{setup::Workspace, RunConfig};
use crate::data::conll_writer::write_predicted_conll;
use crate::domain::example::Prediction;
use crate::domain::traits::FrameIdentifier;
use crate::ml::{inferencer::Inferencer, InferBackend};

pub struct PredictUseCase {
    config: RunConfig,
}

impl PredictUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Returns the path the predictions were written to.
    pub fn execute(&self) -> Result<PathBuf> {
        let cfg = &self.config;
        let ws = Workspace::prepare(cfg)?;
        let device = <InferBackend as Backend>::Device::default();
        let inferencer = Inferencer::<InferBackend>::from_checkpoint(
            &ws.ckpt,
            &ws.model_config(cfg),
            ws.queries(cfg),
            &device,
        )?;

        let predictions: Vec<Prediction> = ws.eval.iter().map(|ex| inferencer.identify(ex)).collect();

        let out = cfg.output_conll();
        write_predicted_conll(&out, &ws.eval, &predictions, &ws.dicts)?;
        tracing::info!("Wrote frames for {} targets to {}", predictions.len(), out.display());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{setup::tests::toy_run, train_use_case::TrainUseCase, Mode};
    use crate::data::conll::{tests::row, FRAME_COL};

    #[test]
    fn test_fills_in_frames_for_raw_targets() {
        let dir = tempfile::tempdir().unwrap();
        let train = toy_run(dir.path(), Mode::Train);
        TrainUseCase::new(train.clone()).execute().unwrap();

        let raw = dir.path().join("raw.conll");
        let text = [
            row(1, "Cats", "NNS", 0, "cat.n", "_"),
            row(2, "sleep", "VBP", 0, "_", "_"),
            String::new(),
        ]
        .join("\n");
        std::fs::write(&raw, text).unwrap();

        let cfg = RunConfig { mode: Mode::Predict, raw_input: Some(raw), ..train };
        let out = PredictUseCase::new(cfg).execute().unwrap();
        assert!(out.ends_with("predicted-frames.conll"));

        let written = std::fs::read_to_string(out).unwrap();
        let first: Vec<&str> = written.lines().next().unwrap().split('\t').collect();
        assert_eq!(first[FRAME_COL], "Animals");
    }
}
