// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::Result;
use burn::prelude::*;

use crate::domain::example::{Example, Prediction};
use crate::domain::traits::FrameIdentifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{FrameIdConfig, FrameIdModel};
use crate::ml::query::QueryBuilder;

/// A model in evaluation mode plus what it needs to turn examples into queries.
pub struct Inferencer<'a, B: Backend> {
    model:   FrameIdModel<B>,
    queries: QueryBuilder<'a>,
}

impl<'a, B: Backend> Inferencer<'a, B> {
    pub fn new(model: FrameIdModel<B>, queries: QueryBuilder<'a>) -> Self {
        Self { model, queries }
    }

    /// Rebuild the saved architecture and load its parameters.
    ///
    /// `expected` is the config implied by the current vocabularies; the saved
    /// one must agree with it on every table size.
    pub fn from_checkpoint(
        ckpt:     &CheckpointManager,
        expected: &FrameIdConfig,
        queries:  QueryBuilder<'a>,
        device:   &B::Device,
    ) -> Result<Self> {
        let cfg = ckpt.load_config()?;
        cfg.check_compatible(expected)?;
        let model = ckpt.load_model(cfg.init::<B>(device), device)?;
        Ok(Self::new(model, queries))
    }

    pub fn model(&self) -> &FrameIdModel<B> {
        &self.model
    }

    /// Restricted log-probabilities in candidate order.
    pub fn log_probs(&self, example: &Example) -> Vec<f32> {
        self.model.score(&self.queries.build(example)).values()
    }
}

impl<B: Backend> FrameIdentifier for Inferencer<'_, B> {
    fn identify(&self, example: &Example) -> Prediction {
        let query = self.queries.build(example);
        let frame = self.model.identify(&query, None).frame;
        example.prediction_for(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::{LexicalUnit, TargetFrameMap};
    use crate::domain::lexicon::FrameLexicon;
    use crate::ml::model::tests::tiny_config;
    use burn::backend::NdArray;

    fn example() -> Example {
        let mut targets = TargetFrameMap::new();
        targets.insert(1, (LexicalUnit::new(2, 1), 3));
        Example::new(vec![1, 2, 3, 4], vec![1, 2, 1, 3], targets, 0, vec![]).unwrap()
    }

    #[test]
    fn test_checkpoint_round_trip_scores_identically() {
        let device = Default::default();
        let lexicon = FrameLexicon::from_pairs([(2, 1), (2, 3), (2, 4)]);
        let queries = QueryBuilder::new(&lexicon, 6);
        let cfg = tiny_config(None);

        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path(), "1.7").unwrap();
        let original = Inferencer::new(cfg.init::<NdArray>(&device), queries);
        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(original.model()).unwrap();

        let restored = Inferencer::<NdArray>::from_checkpoint(&ckpt, &cfg, queries, &device).unwrap();
        let ex = example();
        assert_eq!(original.log_probs(&ex), restored.log_probs(&ex));
        assert_eq!(original.identify(&ex), restored.identify(&ex));
    }

    #[test]
    fn test_incompatible_checkpoint_is_rejected() {
        let device = Default::default();
        let lexicon = FrameLexicon::default();
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path(), "1.7").unwrap();
        let cfg = tiny_config(None);
        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(&cfg.init::<NdArray>(&device)).unwrap();

        let bigger = FrameIdConfig { num_frames: 9, ..tiny_config(None) };
        let result = Inferencer::<NdArray>::from_checkpoint(&ckpt, &bigger, QueryBuilder::new(&lexicon, 9), &device);
        assert!(result.is_err());
    }

    #[test]
    fn test_prediction_covers_every_target() {
        let device = Default::default();
        let lexicon = FrameLexicon::from_pairs([(2, 1), (2, 3)]);
        let inferencer = Inferencer::new(tiny_config(None).init::<NdArray>(&device), QueryBuilder::new(&lexicon, 6));
        let mut targets = TargetFrameMap::new();
        targets.insert(1, (LexicalUnit::new(2, 1), 3));
        targets.insert(2, (LexicalUnit::new(2, 1), 3));
        let ex = Example::new(vec![1, 2, 3, 4], vec![1, 2, 1, 3], targets, 0, vec![]).unwrap();

        let predicted = inferencer.identify(&ex);
        assert_eq!(predicted.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        let frames: Vec<_> = predicted.values().map(|&(_, f)| f).collect();
        assert_eq!(frames[0], frames[1]);
        assert!(frames[0] == 1 || frames[0] == 3);
    }
}
