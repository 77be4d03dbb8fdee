// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one run of the frame
// identifier. Every mode shares the same preparation:
//
//   training corpus ─► frame lexicon ─► word vectors ─► lock
//        └──────────────────────────────────────────────┘
//                        Workspace (setup.rs)
//
// and then branches:
//
//   train / refresh → train_use_case.rs
//   test            → test_use_case.rs
//   predict         → predict_use_case.rs
//
// No ML math here, no clap types here.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;

/// Shared setup: vocabularies, lexicon, vectors, model config
pub mod setup;

/// Training from scratch or from the best checkpoint
pub mod train_use_case;

/// Test-set evaluation with analysis log and frame-element output
pub mod test_use_case;

/// Frame prediction for unannotated input
pub mod predict_use_case;

/// Tag in checkpoint and prediction file names.
pub const VERSION: &str = "1.7";

pub const UNK_PROB: f64 = 0.1;
pub const REPORT_EVERY: usize = 100;
pub const DEV_EVAL_EVERY: usize = 5 * REPORT_EVERY;
pub const EPOCHS: usize = 10;
pub const EXEMPLAR_EPOCHS: usize = 25;

pub const TRAIN_FTE: &str = "fn1.7.fulltext.train.syntaxnet.conll";
pub const TRAIN_EXEMPLAR: &str = "fn1.7.exemplar.train.syntaxnet.conll";
pub const DEV_CONLL: &str = "fn1.7.dev.syntaxnet.conll";
pub const TEST_CONLL: &str = "fn1.7.test.syntaxnet.conll";
pub const FRAME_LEXICON: &str = "frame-lexicon.tsv";
pub const WORD_VECTORS: &str = "glove.6B.100d.framenet.txt";

// ─── Mode ─────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Train,
    Test,
    Refresh,
    Predict,
}

impl Mode {
    /// Train and refresh update parameters; test and predict only read them.
    pub fn trains(self) -> bool {
        matches!(self, Mode::Train | Mode::Refresh)
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train"   => Ok(Mode::Train),
            "test"    => Ok(Mode::Test),
            "refresh" => Ok(Mode::Refresh),
            "predict" => Ok(Mode::Predict),
            other     => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Train   => "train",
            Mode::Test    => "test",
            Mode::Refresh => "refresh",
            Mode::Predict => "predict",
        };
        f.write_str(name)
    }
}

// ─── Optimizer ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Sgd,
    Adam,
}

impl OptimizerKind {
    pub fn default_learning_rate(self) -> f64 {
        match self {
            OptimizerKind::Sgd  => 0.1,
            OptimizerKind::Adam => 1e-3,
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sgd"  => Ok(OptimizerKind::Sgd),
            "adam" => Ok(OptimizerKind::Adam),
            other  => Err(ConfigError::InvalidOptimizer(other.to_string())),
        }
    }
}

// ─── Run Configuration ───────────────────────────────────────────────────────
// Everything one invocation needs, independent of how it was
// parsed. Path fields left as `None` fall back to the standard
// FrameNet 1.7 file names under `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub mode:          Mode,
    pub model_name:    String,
    pub log_dir:       PathBuf,
    pub data_dir:      PathBuf,
    pub use_dropout:   bool,
    pub use_wordvec:   bool,
    pub hierarchical:  bool,
    pub exemplar:      bool,
    pub raw_input:     Option<PathBuf>,
    pub train_file:    Option<PathBuf>,
    pub dev_file:      Option<PathBuf>,
    pub test_file:     Option<PathBuf>,
    pub frame_lexicon: Option<PathBuf>,
    pub word_vectors:  Option<PathBuf>,
    pub optimizer:     OptimizerKind,
    pub learning_rate: Option<f64>,
    pub seed:          u64,
    pub report_every:  usize,
    pub dev_every:     usize,
    pub epochs:        Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode:          Mode::Train,
            model_name:    "frameid".to_string(),
            log_dir:       PathBuf::from("logs"),
            data_dir:      PathBuf::from("data"),
            use_dropout:   true,
            use_wordvec:   true,
            hierarchical:  false,
            exemplar:      false,
            raw_input:     None,
            train_file:    None,
            dev_file:      None,
            test_file:     None,
            frame_lexicon: None,
            word_vectors:  None,
            optimizer:     OptimizerKind::Sgd,
            learning_rate: None,
            seed:          1,
            report_every:  REPORT_EVERY,
            dev_every:     DEV_EVAL_EVERY,
            epochs:        None,
        }
    }
}

impl RunConfig {
    /// Preconditions checked before any file is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == Mode::Predict && self.raw_input.is_none() {
            return Err(ConfigError::MissingRawInput);
        }
        if self.report_every == 0 {
            return Err(ConfigError::ZeroInterval("report-every"));
        }
        if self.dev_every == 0 {
            return Err(ConfigError::ZeroInterval("dev-every"));
        }
        Ok(())
    }

    /// `logs/<model-name>`
    pub fn model_dir(&self) -> PathBuf {
        self.log_dir.join(&self.model_name)
    }

    pub fn train_path(&self) -> PathBuf {
        let default = if self.exemplar { TRAIN_EXEMPLAR } else { TRAIN_FTE };
        self.data_path(&self.train_file, default)
    }

    /// Dev set while training, test set in test mode, raw input in predict mode.
    pub fn eval_path(&self) -> PathBuf {
        match self.mode {
            Mode::Train | Mode::Refresh => self.data_path(&self.dev_file, DEV_CONLL),
            Mode::Test => self.data_path(&self.test_file, TEST_CONLL),
            Mode::Predict => self.raw_input.clone().unwrap_or_default(),
        }
    }

    pub fn frame_lexicon_path(&self) -> PathBuf {
        self.data_path(&self.frame_lexicon, FRAME_LEXICON)
    }

    pub fn word_vectors_path(&self) -> PathBuf {
        self.data_path(&self.word_vectors, WORD_VECTORS)
    }

    pub fn output_conll(&self) -> PathBuf {
        let name = match self.mode {
            Mode::Train | Mode::Refresh => format!("predicted-{VERSION}-frameid-dev.conll"),
            Mode::Test => format!("predicted-{VERSION}-frameid-test.conll"),
            Mode::Predict => "predicted-frames.conll".to_string(),
        };
        self.model_dir().join(name)
    }

    pub fn frame_elements_path(&self) -> PathBuf {
        self.model_dir().join(format!("predicted-{VERSION}-frameid-test.fes"))
    }

    pub fn analysis_log_path(&self) -> PathBuf {
        self.model_dir().join("frameid-prediction-analysis.log")
    }

    /// Dropout is only ever on while training.
    pub fn dropout_enabled(&self) -> bool {
        self.use_dropout && self.mode.trains()
    }

    pub fn num_epochs(&self) -> usize {
        self.epochs
            .unwrap_or(if self.exemplar { EXEMPLAR_EPOCHS } else { EPOCHS })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
            .unwrap_or_else(|| self.optimizer.default_learning_rate())
    }

    /// The settings banner printed at startup.
    pub fn log_settings(&self, model_file: &std::path::Path) {
        tracing::info!("PARSER SETTINGS");
        tracing::info!("PARSING MODE:    {}", self.mode);
        tracing::info!("USING EXEMPLAR?  {}", self.exemplar);
        tracing::info!("USING DROPOUT?   {}", self.dropout_enabled());
        tracing::info!("USING WORDVECS?  {}", self.use_wordvec);
        tracing::info!("USING HIERARCHY? {}", self.hierarchical);
        if self.mode.trains() {
            tracing::info!("VALIDATED MODEL WILL BE SAVED TO {}", model_file.display());
        } else {
            tracing::info!("MODEL USED FOR TEST / PREDICTION: {}", model_file.display());
        }
    }

    fn data_path(&self, explicit: &Option<PathBuf>, default: &str) -> PathBuf {
        explicit.clone().unwrap_or_else(|| self.data_dir.join(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("refresh".parse::<Mode>().unwrap(), Mode::Refresh);
        assert_eq!(
            "tune".parse::<Mode>().unwrap_err(),
            ConfigError::InvalidMode("tune".to_string())
        );
        assert!(Mode::Refresh.trains());
        assert!(!Mode::Predict.trains());
    }

    #[test]
    fn test_predict_requires_raw_input() {
        let cfg = RunConfig { mode: Mode::Predict, ..RunConfig::default() };
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::MissingRawInput);
        let cfg = RunConfig { raw_input: Some("in.conll".into()), ..cfg };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.eval_path(), PathBuf::from("in.conll"));
    }

    #[test]
    fn test_paths_follow_mode_and_model_name() {
        let cfg = RunConfig { model_name: "fid".into(), ..RunConfig::default() };
        assert_eq!(cfg.model_dir(), PathBuf::from("logs/fid"));
        assert_eq!(cfg.eval_path(), PathBuf::from("data").join(DEV_CONLL));
        assert!(cfg.output_conll().ends_with("predicted-1.7-frameid-dev.conll"));

        let test = RunConfig { mode: Mode::Test, ..cfg.clone() };
        assert_eq!(test.eval_path(), PathBuf::from("data").join(TEST_CONLL));
        assert!(test.output_conll().ends_with("predicted-1.7-frameid-test.conll"));
        assert!(!test.dropout_enabled());

        let exemplar = RunConfig { exemplar: true, ..cfg };
        assert_eq!(exemplar.train_path(), PathBuf::from("data").join(TRAIN_EXEMPLAR));
        assert_eq!(exemplar.num_epochs(), EXEMPLAR_EPOCHS);
    }

    #[test]
    fn test_learning_rate_defaults_per_optimizer() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.learning_rate(), 0.1);
        let adam = RunConfig { optimizer: OptimizerKind::Adam, ..cfg };
        assert_eq!(adam.learning_rate(), 1e-3);
        assert_eq!("adagrad".parse::<OptimizerKind>().unwrap_err(),
            ConfigError::InvalidOptimizer("adagrad".into()));
    }
}
