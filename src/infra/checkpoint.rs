// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Everything a trained model leaves behind in its model directory:
//
//   logs/<model-name>/
//     best-frameid-<version>-model.mpk.gz  ← parameters (full precision)
//     model_config.json                    ← FrameIdConfig, to rebuild the model
//     best-dev-f1.txt                      ← one F1 per line, last line wins
//
// The recorder appends `.gz` to the path it is given, and swaps
// whatever it takes for an extension, so the model path always
// ends in `.mpk` to keep dotted version tags intact.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::infra::atomic::write_atomic;
use crate::ml::model::{FrameIdConfig, FrameIdModel};

const CONFIG_FILE: &str = "model_config.json";
const BEST_F1_FILE: &str = "best-dev-f1.txt";

type ModelRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

pub struct CheckpointManager {
    dir:     PathBuf,
    version: String,
}

impl CheckpointManager {
    /// Creates the model directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>, version: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create model directory '{}'", dir.display()))?;
        Ok(Self { dir, version: version.into() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path handed to the recorder (the file on disk gets `.gz` appended).
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(format!("best-frameid-{}-model.mpk", self.version))
    }

    pub fn model_file(&self) -> PathBuf {
        self.dir.join(format!("best-frameid-{}-model.mpk.gz", self.version))
    }

    pub fn best_f1_path(&self) -> PathBuf {
        self.dir.join(BEST_F1_FILE)
    }

    /// Record to a sibling temp file, then rename over the previous checkpoint.
    pub fn save_model<B: Backend>(&self, model: &FrameIdModel<B>) -> Result<()> {
        let staging = self.dir.join(format!("best-frameid-{}-model.partial.mpk", self.version));
        ModelRecorder::new()
            .record(model.clone().into_record(), staging.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", staging.display()))?;

        let written = self.dir.join(format!("best-frameid-{}-model.partial.mpk.gz", self.version));
        let target = self.model_file();
        fs::rename(&written, &target)
            .with_context(|| format!("Cannot move checkpoint into '{}'", target.display()))?;

        tracing::debug!("Saved model to '{}'", target.display());
        Ok(())
    }

    /// `model` must have the architecture the checkpoint was recorded from.
    pub fn load_model<B: Backend>(&self, model: FrameIdModel<B>, device: &B::Device) -> Result<FrameIdModel<B>> {
        let path = self.model_path();
        let record = ModelRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    self.model_file().display()
                )
            })?;
        tracing::info!("Loaded model from '{}'", self.model_file().display());
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &FrameIdConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        write_atomic(&path, json.as_bytes())
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<FrameIdConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have trained this model first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json).with_context(|| format!("Malformed config '{}'", path.display()))
    }

    /// Appends `f1` to the history and rewrites the file atomically.
    pub fn save_best_f1(&self, f1: f64) -> Result<()> {
        let path = self.best_f1_path();
        let mut history = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e).with_context(|| format!("Cannot read '{}'", path.display())),
        };
        if !history.is_empty() && !history.ends_with('\n') {
            history.push('\n');
        }
        history.push_str(&format!("{f1}\n"));
        write_atomic(&path, history.as_bytes())
    }

    /// Last non-empty line of the best-F1 file.
    pub fn load_best_f1(&self) -> Result<f64> {
        let path = self.best_f1_path();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read best F1 from '{}'", path.display()))?;
        let last = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .with_context(|| format!("'{}' holds no F1 value", path.display()))?;
        last.parse::<f64>()
            .with_context(|| format!("Bad F1 value '{}' in '{}'", last, path.display()))
    }
}
