// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and routes to the use case
// for the selected mode:
//
//   --mode train | refresh → TrainUseCase
//   --mode test            → TestUseCase
//   --mode predict         → PredictUseCase
//
// The run config is validated before any data is loaded.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::RunArgs;

use crate::application::{
    predict_use_case::PredictUseCase, test_use_case::TestUseCase, train_use_case::TrainUseCase,
    Mode, RunConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "frame-id",
    version,
    about = "BiLSTM frame identification for FrameNet targets."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: RunArgs,
}

impl Cli {
    /// Validate, then dispatch to the use case for the mode.
    pub fn run(self) -> Result<()> {
        let cfg = RunConfig::try_from(self.args)?;
        cfg.validate()?;

        match cfg.mode {
            Mode::Train | Mode::Refresh => {
                let outcome = TrainUseCase::new(cfg).execute()?;
                println!(
                    "Training complete. Best dev F1 = {:.4} ({} checkpoint(s) written).",
                    outcome.best_f1, outcome.checkpoints
                );
            }
            Mode::Test => {
                let scores = TestUseCase::new(cfg).execute()?;
                println!(
                    "Test: precision = {:.4} recall = {:.4} f1 = {:.4}",
                    scores.precision, scores.recall, scores.f1
                );
            }
            Mode::Predict => {
                let out = PredictUseCase::new(cfg).execute()?;
                println!("Predictions written to {}", out.display());
            }
        }
        Ok(())
    }
}
