// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per dev evaluation so learning curves can
// be plotted after the run.
//
// Output file: logs/<model-name>/metrics.csv
//
//   step,epoch,train_loss,dev_precision,dev_recall,dev_f1
//   500,0,1.204311,0.612000,0.598000,0.604919
//   1000,0,0.873020,0.701000,0.688000,0.694440
//
// The file is appended to, so a refresh run continues the
// curve of the run it restarts from.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::domain::evaluation::PrfScores;

const HEADER: &str = "step,epoch,train_loss,dev_precision,dev_recall,dev_f1";

/// One dev evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevMetrics {
    /// Training examples seen so far, across epochs.
    pub step: usize,

    /// 0-based epoch the evaluation happened in.
    pub epoch: usize,

    /// Average training loss since the previous dev evaluation.
    /// Examples without a loss term (singleton LUs) count as zero.
    pub train_loss: f64,

    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
}

impl DevMetrics {
    pub fn new(step: usize, epoch: usize, train_loss: f64, scores: PrfScores) -> Self {
        Self {
            step,
            epoch,
            train_loss,
            precision: scores.precision,
            recall:    scores.recall,
            f1:        scores.f1,
        }
    }

    /// Strictly better than the best F1 seen so far.
    pub fn is_improvement(&self, best_f1: f64) -> bool {
        self.f1 > best_f1
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &DevMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6}",
            m.step, m.epoch, m.train_loss, m.precision, m.recall, m.f1,
        )?;

        tracing::debug!("Logged dev metrics at step {}: f1={:.4}", m.step, m.f1);
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(f1: f64) -> DevMetrics {
        DevMetrics::new(500, 0, 1.0, PrfScores { precision: f1, recall: f1, f1 })
    }

    #[test]
    fn test_is_improvement() {
        let m = metrics(0.6);
        assert!(m.is_improvement(0.5));
        // equal is not an improvement
        assert!(!m.is_improvement(0.6));
        assert!(!m.is_improvement(0.7));
    }

    #[test]
    fn test_rows_are_appended_under_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&metrics(0.5)).unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&metrics(0.6)).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[2].ends_with(",0.600000"));
    }
}
