use crate::data::pretrained::PretrainedVectors;
use crate::data::vocab::UNK_ID;
use crate::domain::example::{Example, FrameId, LexicalUnit};
use crate::domain::lexicon::FrameLexicon;

/// Everything the model needs to score one target, already resolved to ids.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameQuery {
    pub tokens:          Vec<usize>,
    pub postags:         Vec<usize>,
    /// `true` where the token has a pretrained vector.
    pub pretrained_mask: Vec<bool>,
    /// Target positions, ascending.
    pub targets:         Vec<usize>,
    pub lu:              LexicalUnit,
    /// Non-empty, ascending frame ids.
    pub candidates:      Vec<FrameId>,
    /// Sibling LUs whose embeddings replace the LU's own (hierarchical mode).
    pub siblings:        Option<Vec<usize>>,
}

/// Resolves examples into [`FrameQuery`]s against the static resources.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    lexicon:      &'a FrameLexicon,
    pretrained:   Option<&'a PretrainedVectors>,
    hierarchical: bool,
    num_frames:   usize,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(lexicon: &'a FrameLexicon, num_frames: usize) -> Self {
        Self { lexicon, pretrained: None, hierarchical: false, num_frames }
    }

    pub fn with_pretrained(mut self, pretrained: Option<&'a PretrainedVectors>) -> Self {
        self.pretrained = pretrained;
        self
    }

    pub fn with_hierarchy(mut self, hierarchical: bool) -> Self {
        self.hierarchical = hierarchical;
        self
    }

    pub fn build(&self, example: &Example) -> FrameQuery {
        self.build_with_tokens(example, example.tokens.clone())
    }

    /// Same as [`build`](Self::build) but with substituted tokens (UNK replacement).
    pub fn build_with_tokens(&self, example: &Example, tokens: Vec<usize>) -> FrameQuery {
        let pretrained_mask = tokens
            .iter()
            .map(|&t| self.pretrained.is_some_and(|p| p.contains(t)))
            .collect();
        let siblings = if self.hierarchical {
            self.lexicon.related(example.lu.id).map(<[usize]>::to_vec)
        } else {
            None
        };
        FrameQuery {
            tokens,
            postags: example.postags.clone(),
            pretrained_mask,
            targets: example.target_positions(),
            lu: example.lu,
            candidates: self.candidates(example.lu),
            siblings,
        }
    }

    fn candidates(&self, lu: LexicalUnit) -> Vec<FrameId> {
        if let Some(frames) = self.lexicon.candidates(lu.id) {
            return frames.to_vec();
        }
        tracing::debug!("no candidate frames for LU {}; scoring every frame", lu.id);
        let all: Vec<FrameId> = (UNK_ID + 1..self.num_frames).collect();
        if all.is_empty() { vec![UNK_ID] } else { all }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vocab::Vocab;
    use crate::domain::example::TargetFrameMap;

    fn example(lu: usize) -> Example {
        let mut targets = TargetFrameMap::new();
        targets.insert(2, (LexicalUnit::new(lu, 1), 3));
        targets.insert(1, (LexicalUnit::new(lu, 1), 3));
        Example::new(vec![1, 2, 3], vec![1, 1, 1], targets, 0, vec![]).unwrap()
    }

    #[test]
    fn test_candidates_and_targets() {
        let lex = FrameLexicon::from_pairs([(4, 3), (4, 5), (6, 5)]);
        let q = QueryBuilder::new(&lex, 7).build(&example(4));
        assert_eq!(q.candidates, vec![3, 5]);
        assert_eq!(q.targets, vec![1, 2]);
        assert_eq!(q.siblings, None);
        assert_eq!(q.pretrained_mask, vec![false; 3]);
    }

    #[test]
    fn test_siblings_only_in_hierarchical_mode() {
        let lex = FrameLexicon::from_pairs([(4, 5), (6, 5)]);
        let q = QueryBuilder::new(&lex, 7).with_hierarchy(true).build(&example(4));
        assert_eq!(q.siblings, Some(vec![6]));
    }

    #[test]
    fn test_unlisted_lu_falls_back_to_all_frames() {
        let lex = FrameLexicon::from_pairs([(4, 3)]);
        let q = QueryBuilder::new(&lex, 4).build(&example(9));
        assert_eq!(q.candidates, vec![1, 2, 3]);
    }

    #[test]
    fn test_pretrained_mask_follows_tokens() {
        let mut vocab = Vocab::new("tokens");
        vocab.index("a");
        vocab.index("b");
        let vecs = PretrainedVectors::parse("b 0.5 0.5\n".as_bytes(), &vocab).unwrap();
        let lex = FrameLexicon::from_pairs([(4, 3)]);
        let builder = QueryBuilder::new(&lex, 4).with_pretrained(Some(&vecs));
        let ex = example(4);
        assert_eq!(builder.build(&ex).pretrained_mask, vec![false, true, false]);
        let q = builder.build_with_tokens(&ex, vec![0, 0, 2]);
        assert_eq!(q.pretrained_mask, vec![false, false, true]);
    }
}
