// ============================================================
// Layer 3 — Example Domain Type
// ============================================================
// One annotated target instance: a POS-tagged sentence plus the
// token positions that make up a single lexical-unit target.
// The same sentence appears once per annotated target.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ExampleError;

pub type FrameId = usize;

/// A lexical unit is a lemma id paired with its LU-POS id (`run.v`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LexicalUnit {
    pub id:     usize,
    pub pos_id: usize,
}

impl LexicalUnit {
    pub fn new(id: usize, pos_id: usize) -> Self {
        Self { id, pos_id }
    }
}

/// Target token index → (lexical unit, frame).
pub type TargetFrameMap = BTreeMap<usize, (LexicalUnit, FrameId)>;

/// Same shape as the gold map, filled with predicted frames.
pub type Prediction = TargetFrameMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    pub tokens:   Vec<usize>,
    pub postags:  Vec<usize>,
    pub lu:       LexicalUnit,
    pub frame:    FrameId,
    pub targets:  TargetFrameMap,
    pub sent_num: usize,
    /// Original CoNLL columns, one row per token, kept for re-emission.
    pub rows:     Vec<Vec<String>>,
}

impl Example {
    /// Build an example, enforcing that all target tokens share one frame.
    pub fn new(
        tokens:   Vec<usize>,
        postags:  Vec<usize>,
        targets:  TargetFrameMap,
        sent_num: usize,
        rows:     Vec<Vec<String>>,
    ) -> Result<Self, ExampleError> {
        if tokens.len() != postags.len() {
            return Err(ExampleError::LengthMismatch {
                tokens:  tokens.len(),
                postags: postags.len(),
            });
        }

        let (lu, frame) = match targets.values().next() {
            Some(&first) => first,
            None => return Err(ExampleError::NoTargets { sent_num }),
        };

        if let Some(&index) = targets.keys().find(|&&i| i >= tokens.len()) {
            return Err(ExampleError::TargetOutOfRange { index, len: tokens.len() });
        }

        if targets.values().any(|&(_, f)| f != frame) {
            return Err(ExampleError::InconsistentFrames { targets });
        }

        Ok(Self { tokens, postags, lu, frame, targets, sent_num, rows })
    }

    /// Target positions in sentence order.
    pub fn target_positions(&self) -> Vec<usize> {
        self.targets.keys().copied().collect()
    }

    pub fn is_multi_token(&self) -> bool {
        self.targets.len() > 1
    }

    /// Assign one (lexical unit, frame) pair to every target position.
    pub fn prediction_for(&self, frame: FrameId) -> Prediction {
        self.targets
            .keys()
            .map(|&idx| (idx, (self.lu, frame)))
            .collect()
    }
}
