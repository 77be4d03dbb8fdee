// ============================================================
// Layer 2 — TestUseCase
// ============================================================
// Scores the best checkpoint on the test set:
//
//   Step 1: Prepare workspace, load checkpoint
//   Step 2: Predict every test example (dropout off)
//   Step 3: Per-sentence analysis log
//   Step 4: Predicted CoNLL + frame-element file
//   Step 5: Corpus precision / recall / F1

use anyhow::Result;
use burn::prelude::*;

use crate::application::{setup::Workspace, RunConfig};
use crate::data::conll_writer::{write_frame_elements, write_predicted_conll};
use crate::domain::evaluation::PrfScores;
use crate::domain::traits::FrameIdentifier;
use crate::infra::analysis_log::AnalysisLog;
use crate::ml::{inferencer::Inferencer, InferBackend};

pub struct TestUseCase {
    config: RunConfig,
}

impl TestUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PrfScores> {
        let cfg = &self.config;

        // ── Step 1: workspace + checkpoint ────────────────────────────────────
        let ws = Workspace::prepare(cfg)?;
        let device = <InferBackend as Backend>::Device::default();
        let inferencer = Inferencer::<InferBackend>::from_checkpoint(
            &ws.ckpt,
            &ws.model_config(cfg),
            ws.queries(cfg),
            &device,
        )?;

        // ── Step 2: predictions ───────────────────────────────────────────────
        let evaluation = inferencer.evaluate(&ws.eval);

        // ── Step 3: analysis log ──────────────────────────────────────────────
        let mut log = AnalysisLog::create(&cfg.analysis_log_path())?;
        for ((example, predicted), counts) in ws
            .eval
            .iter()
            .zip(&evaluation.predictions)
            .zip(&evaluation.per_example)
        {
            log.record(example, predicted, *counts, &ws.dicts)?;
        }
        log.finish()?;

        // ── Step 4: output files ──────────────────────────────────────────────
        write_predicted_conll(&cfg.output_conll(), &ws.eval, &evaluation.predictions, &ws.dicts)?;
        write_frame_elements(&cfg.frame_elements_path(), &ws.eval, &evaluation.predictions, &ws.dicts)?;
        tracing::info!("Printed to {}", cfg.output_conll().display());

        // ── Step 5: scores ────────────────────────────────────────────────────
        let counts = evaluation.corpus;
        let scores = counts.scores();
        tracing::info!(
            "[test] p = {:.4} ({:.1}/{:.1}) r = {:.4} ({:.1}/{:.1}) f1 = {:.4}",
            scores.precision,
            counts.true_pos as f64,
            counts.predicted() as f64,
            scores.recall,
            counts.true_pos as f64,
            counts.gold() as f64,
            scores.f1,
        );
        Ok(scores)
    }
}
