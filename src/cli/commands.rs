// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// One flat set of flags; `--mode` picks the workflow.
//
// `--mode` and `--optimizer` are kept as strings here and parsed
// by the application layer, so an unknown value surfaces as a
// ConfigError instead of a clap usage error.

use std::path::PathBuf;

use clap::Args;

use crate::application::{OptimizerKind, RunConfig, DEV_EVAL_EVERY, REPORT_EVERY};
use crate::domain::errors::ConfigError;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// train | test | refresh | predict
    #[arg(long, default_value = "train")]
    pub mode: String,

    /// Name of the model directory under --log-dir
    #[arg(short = 'n', long, default_value = "frameid")]
    pub model_name: String,

    /// Disable dropout while training
    #[arg(long)]
    pub nodrop: bool,

    /// Do not use pretrained word vectors
    #[arg(long)]
    pub nowordvec: bool,

    /// Represent an LU by the sum of its sibling LUs
    #[arg(long)]
    pub hier: bool,

    /// Train on the exemplar corpus instead of full text
    #[arg(long)]
    pub exemplar: bool,

    /// Input CoNLL file for --mode predict
    #[arg(long, value_name = "FILE")]
    pub raw_input: Option<PathBuf>,

    /// Directory holding the FrameNet 1.7 data files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory holding one sub-directory per model
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Override the training corpus path
    #[arg(long, value_name = "FILE")]
    pub train_file: Option<PathBuf>,

    /// Override the dev corpus path
    #[arg(long, value_name = "FILE")]
    pub dev_file: Option<PathBuf>,

    /// Override the test corpus path
    #[arg(long, value_name = "FILE")]
    pub test_file: Option<PathBuf>,

    /// Override the frame lexicon path (FRAME<TAB>lemma.pos per line)
    #[arg(long, value_name = "FILE")]
    pub frame_lexicon: Option<PathBuf>,

    /// Override the pretrained word vector path (GloVe text format)
    #[arg(long, value_name = "FILE")]
    pub word_vectors: Option<PathBuf>,

    /// sgd | adam
    #[arg(long, default_value = "sgd")]
    pub optimizer: String,

    /// Learning rate (default: 0.1 for sgd, 0.001 for adam)
    #[arg(long)]
    pub lr: Option<f64>,

    /// Seed for shuffling and UNK replacement
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Log the running loss every N examples
    #[arg(long, default_value_t = REPORT_EVERY)]
    pub report_every: usize,

    /// Evaluate on dev every N examples
    #[arg(long, default_value_t = DEV_EVAL_EVERY)]
    pub dev_every: usize,

    /// Number of epochs (default: 10, or 25 with --exemplar)
    #[arg(long)]
    pub epochs: Option<usize>,
}

/// Convert CLI RunArgs into the application-layer RunConfig.
/// The application layer never sees clap types.
impl TryFrom<RunArgs> for RunConfig {
    type Error = ConfigError;

    fn try_from(a: RunArgs) -> Result<Self, Self::Error> {
        let mode = a.mode.parse()?;
        let optimizer: OptimizerKind = a.optimizer.parse()?;
        Ok(RunConfig {
            mode,
            model_name:    a.model_name,
            log_dir:       a.log_dir,
            data_dir:      a.data_dir,
            use_dropout:   !a.nodrop,
            use_wordvec:   !a.nowordvec,
            hierarchical:  a.hier,
            exemplar:      a.exemplar,
            raw_input:     a.raw_input,
            train_file:    a.train_file,
            dev_file:      a.dev_file,
            test_file:     a.test_file,
            frame_lexicon: a.frame_lexicon,
            word_vectors:  a.word_vectors,
            optimizer,
            learning_rate: a.lr,
            seed:          a.seed,
            report_every:  a.report_every,
            dev_every:     a.dev_every,
            epochs:        a.epochs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Mode;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> Result<RunConfig, ConfigError> {
        let wrapper = Wrapper::parse_from(std::iter::once("frame-id").chain(argv.iter().copied()));
        RunConfig::try_from(wrapper.args)
    }

    #[test]
    fn test_flags_map_onto_config() {
        let cfg = parse(&["--mode", "refresh", "-n", "fn17", "--nodrop", "--hier", "--lr", "0.05"]).unwrap();
        assert_eq!(cfg.mode, Mode::Refresh);
        assert_eq!(cfg.model_name, "fn17");
        assert!(!cfg.use_dropout);
        assert!(cfg.use_wordvec);
        assert!(cfg.hierarchical);
        assert_eq!(cfg.learning_rate(), 0.05);
        assert_eq!(cfg.dev_every, DEV_EVAL_EVERY);
    }

    #[test]
    fn test_unknown_mode_is_a_config_error() {
        assert_eq!(
            parse(&["--mode", "serve"]).unwrap_err(),
            ConfigError::InvalidMode("serve".to_string())
        );
    }
}
