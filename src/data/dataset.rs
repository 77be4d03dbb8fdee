use rand::{seq::SliceRandom, Rng};

use crate::domain::example::Example;

/// The training examples, reshuffled at the start of every epoch.
pub struct FrameIdDataset {
    examples: Vec<Example>,
}

impl FrameIdDataset {
    pub fn new(examples: Vec<Example>) -> Self { Self { examples } }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.examples.shuffle(rng);
    }

    pub fn examples(&self) -> &[Example] { &self.examples }

    pub fn len(&self) -> usize { self.examples.len() }
}

/// Replace each token by `unk` independently with probability `prob`.
pub fn unk_replace<R: Rng + ?Sized>(tokens: &[usize], prob: f64, unk: usize, rng: &mut R) -> Vec<usize> {
    tokens
        .iter()
        .map(|&t| if prob > 0.0 && rng.gen::<f64>() < prob { unk } else { t })
        .collect()
}
