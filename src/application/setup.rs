// ============================================================
// Layer 2 — Run Setup
// ============================================================
// The preparation every mode shares, in the order the
// vocabularies require:
//
//   Step 1: Read the training corpus      (vocabularies open)
//   Step 2: Read the frame lexicon        (adds LUs and frames)
//   Step 3: Read pretrained word vectors  (training tokens only)
//   Step 4: Lock the vocabularies
//   Step 5: Read the dev / test / raw set (unknowns become UNK)
//
// Embedding tables are sized from the locked vocabularies, so
// the model config can only be built after Step 4.

use anyhow::Result;

use crate::application::{Mode, RunConfig, VERSION};
use crate::data::{
    conll::{report_multi_token_targets, ConllCorpus, CorpusSource},
    dictionaries::Dictionaries,
    frame_lexicon::load_frame_lexicon,
    pretrained::PretrainedVectors,
    vocab::UNK_ID,
};
use crate::domain::example::Example;
use crate::domain::lexicon::FrameLexicon;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::FrameIdConfig;
use crate::ml::query::QueryBuilder;

pub struct Workspace {
    pub dicts:      Dictionaries,
    pub train:      Vec<Example>,
    /// Dev set (train/refresh), test set (test) or raw input (predict).
    pub eval:       Vec<Example>,
    pub lexicon:    FrameLexicon,
    pub pretrained: Option<PretrainedVectors>,
    pub ckpt:       CheckpointManager,
}

impl Workspace {
    pub fn prepare(cfg: &RunConfig) -> Result<Self> {
        let ckpt = CheckpointManager::new(cfg.model_dir(), VERSION)?;
        cfg.log_settings(&ckpt.model_file());

        // ── Step 1: training corpus ───────────────────────────────────────────
        let mut dicts = Dictionaries::new();
        let train = ConllCorpus::new(cfg.train_path()).load(&mut dicts)?;
        report_multi_token_targets(&train, "train");

        // ── Step 2: frame lexicon ─────────────────────────────────────────────
        let lexicon_path = cfg.frame_lexicon_path();
        let lexicon = if lexicon_path.exists() {
            load_frame_lexicon(&lexicon_path, &mut dicts, &train)?
        } else {
            tracing::warn!(
                "Frame lexicon '{}' not found; candidates come from the training corpus only",
                lexicon_path.display()
            );
            FrameLexicon::from_pairs(
                train.iter().filter(|ex| ex.frame != UNK_ID).map(|ex| (ex.lu.id, ex.frame)),
            )
        };

        // ── Step 3: pretrained vectors ────────────────────────────────────────
        let pretrained = if cfg.use_wordvec {
            let vectors = PretrainedVectors::load(&cfg.word_vectors_path(), &dicts.tokens)?;
            if vectors.is_empty() {
                tracing::warn!("No pretrained vector matches the training vocabulary");
                None
            } else {
                tracing::info!("using pretrained embeddings of dimension {}", vectors.dim());
                Some(vectors)
            }
        } else {
            None
        };

        // ── Step 4: lock ──────────────────────────────────────────────────────
        dicts.lock();
        dicts.log_sizes();

        // ── Step 5: evaluation corpus ─────────────────────────────────────────
        let eval = ConllCorpus::new(cfg.eval_path()).load(&mut dicts)?;
        if cfg.mode != Mode::Predict {
            report_multi_token_targets(&eval, "dev/test");
        }
        dicts.log_unknowns();

        Ok(Self { dicts, train, eval, lexicon, pretrained, ckpt })
    }

    /// Architecture implied by the locked vocabularies.
    pub fn model_config(&self, cfg: &RunConfig) -> FrameIdConfig {
        let model_cfg = FrameIdConfig {
            pretrained_dim: self.pretrained.as_ref().map(PretrainedVectors::dim),
            ..FrameIdConfig::new(
                self.dicts.tokens.len(),
                self.dicts.postags.len(),
                self.dicts.lus.len(),
                self.dicts.lu_pos.len(),
                self.dicts.frames.len(),
            )
        };
        if cfg.dropout_enabled() {
            model_cfg
        } else {
            model_cfg.with_dropout(0.0)
        }
    }

    pub fn queries(&self, cfg: &RunConfig) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.lexicon, self.dicts.frames.len())
            .with_pretrained(self.pretrained.as_ref())
            .with_hierarchy(cfg.hierarchical)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::conll::tests::row;
    use std::{fs, path::Path};

    /// Writes a toy data directory and returns a config pointing at it.
    pub(crate) fn toy_run(root: &Path, mode: Mode) -> RunConfig {
        let data = root.join("data");
        fs::create_dir_all(&data).unwrap();

        let train = [
            row(1, "Planes", "NNS", 0, "_", "_"),
            row(2, "take", "VBP", 0, "take_off.v", "Departing"),
            row(3, "off", "RP", 0, "take_off.v", "Departing"),
            String::new(),
            row(1, "He", "PRP", 1, "_", "_"),
            row(2, "took", "VBD", 1, "take_off.v", "Removing"),
            row(3, "off", "RP", 1, "take_off.v", "Removing"),
            row(4, "it", "PRP", 1, "_", "_"),
            String::new(),
            row(1, "Dogs", "NNS", 2, "dog.n", "Animals"),
            row(2, "bark", "VBP", 2, "_", "_"),
            String::new(),
        ]
        .join("\n");
        let eval = [
            row(1, "Jets", "NNS", 7, "_", "_"),
            row(2, "take", "VBP", 7, "take_off.v", "Departing"),
            row(3, "off", "RP", 7, "take_off.v", "Departing"),
            String::new(),
            row(1, "Cats", "NNS", 8, "cat.n", "Animals"),
            String::new(),
        ]
        .join("\n");
        fs::write(data.join(crate::application::TRAIN_FTE), &train).unwrap();
        fs::write(data.join(crate::application::DEV_CONLL), &eval).unwrap();
        fs::write(data.join(crate::application::TEST_CONLL), &eval).unwrap();
        fs::write(
            data.join(crate::application::FRAME_LEXICON),
            "# frame\tlu\nAnimals\tcat.n\nAnimals\tdog.n\n",
        )
        .unwrap();
        fs::write(data.join(crate::application::WORD_VECTORS), "planes 0.1 0.2\ntake 0.3 0.4\n").unwrap();

        RunConfig {
            mode,
            model_name: "toy".into(),
            log_dir: root.join("logs"),
            data_dir: data,
            report_every: 1,
            dev_every: 3,
            epochs: Some(2),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_prepare_locks_vocabularies_and_reads_resources() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = toy_run(dir.path(), Mode::Train);
        let ws = Workspace::prepare(&cfg).unwrap();

        assert!(ws.dicts.is_locked());
        assert_eq!(ws.train.len(), 3);
        assert_eq!(ws.eval.len(), 2);

        // cat.n only appears in the lexicon, yet is known after locking
        let cat = ws.eval[1].lu.id;
        assert_ne!(cat, UNK_ID);
        assert_eq!(ws.lexicon.candidates(cat).map(<[usize]>::len), Some(1));

        let take_off = ws.train[0].lu.id;
        assert_eq!(ws.lexicon.candidates(take_off).map(<[usize]>::len), Some(2));

        let vectors = ws.pretrained.as_ref().unwrap();
        assert_eq!(vectors.dim(), 2);
        assert_eq!(vectors.len(), 2);

        let model_cfg = ws.model_config(&cfg);
        assert_eq!(model_cfg.vocab_size, ws.dicts.tokens.len());
        assert_eq!(model_cfg.pretrained_dim, Some(2));
    }

    #[test]
    fn test_missing_lexicon_falls_back_to_training_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = toy_run(dir.path(), Mode::Test);
        fs::remove_file(cfg.frame_lexicon_path()).unwrap();
        let cfg = RunConfig { use_wordvec: false, ..cfg };

        let ws = Workspace::prepare(&cfg).unwrap();
        assert!(ws.pretrained.is_none());
        assert!(ws.lexicon.candidates(ws.eval[1].lu.id).is_none());
        assert_eq!(ws.model_config(&cfg).dropout, 0.0);
    }
}
