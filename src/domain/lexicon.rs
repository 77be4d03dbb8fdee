// ============================================================
// Layer 3 — Frame Lexicon
// ============================================================
// Static maps derived from (lexical unit, frame) pairs:
//   candidates: LU → frames the LU can evoke
//   related:    LU → other LUs sharing at least one frame
// Both are read-only once built.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::example::FrameId;

#[derive(Debug, Clone, Default)]
pub struct FrameLexicon {
    candidates: HashMap<usize, Vec<FrameId>>,
    related:    HashMap<usize, Vec<usize>>,
}

impl FrameLexicon {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, FrameId)>) -> Self {
        let mut lu_frames: BTreeMap<usize, BTreeSet<FrameId>> = BTreeMap::new();
        let mut frame_lus: BTreeMap<FrameId, BTreeSet<usize>> = BTreeMap::new();
        for (lu, frame) in pairs {
            lu_frames.entry(lu).or_default().insert(frame);
            frame_lus.entry(frame).or_default().insert(lu);
        }

        let mut related = HashMap::new();
        for (&lu, frames) in &lu_frames {
            let siblings: BTreeSet<usize> = frames
                .iter()
                .flat_map(|f| frame_lus[f].iter().copied())
                .filter(|&other| other != lu)
                .collect();
            if !siblings.is_empty() {
                related.insert(lu, siblings.into_iter().collect());
            }
        }

        let candidates = lu_frames
            .into_iter()
            .map(|(lu, frames)| (lu, frames.into_iter().collect()))
            .collect();

        Self { candidates, related }
    }

    /// Candidate frames in ascending id order, `None` for an unlisted LU.
    pub fn candidates(&self, lu: usize) -> Option<&[FrameId]> {
        self.candidates.get(&lu).map(Vec::as_slice)
    }

    /// Sibling LUs (never including `lu` itself), `None` when there are none.
    pub fn related(&self, lu: usize) -> Option<&[usize]> {
        self.related.get(&lu).map(Vec::as_slice)
    }

    pub fn num_lexical_units(&self) -> usize {
        self.candidates.len()
    }

    pub fn num_ambiguous(&self) -> usize {
        self.candidates.values().filter(|f| f.len() > 1).count()
    }
}
