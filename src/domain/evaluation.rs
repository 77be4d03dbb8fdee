// ============================================================
// Layer 3 — Frame Identification Evaluation
// ============================================================
// True-positive / false-positive / false-negative counting over
// target positions, and precision / recall / F1 on top of it.
// Every degenerate ratio (zero denominator) is 0.

use std::ops::{Add, AddAssign};

use crate::domain::example::{Prediction, TargetFrameMap};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrfCounts {
    pub true_pos:  usize,
    pub false_pos: usize,
    pub false_neg: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrfScores {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
}

impl PrfCounts {
    #[cfg(test)]
    pub fn new(true_pos: usize, false_pos: usize, false_neg: usize) -> Self {
        Self { true_pos, false_pos, false_neg }
    }

    /// TP + FP
    pub fn predicted(&self) -> usize {
        self.true_pos + self.false_pos
    }

    /// TP + FN
    pub fn gold(&self) -> usize {
        self.true_pos + self.false_neg
    }

    pub fn scores(&self) -> PrfScores {
        let precision = ratio(self.true_pos, self.predicted());
        let recall    = ratio(self.true_pos, self.gold());
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        PrfScores { precision, recall, f1 }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl Add for PrfCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            true_pos:  self.true_pos + rhs.true_pos,
            false_pos: self.false_pos + rhs.false_pos,
            false_neg: self.false_neg + rhs.false_neg,
        }
    }
}

impl AddAssign for PrfCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Compare one example's predicted frames with its gold frames, position by position.
///
/// A match counts one TP; a mismatch counts one FP and one FN. A gold position
/// without a prediction is an FN and a predicted position without gold is an FP,
/// so `TP + FP` always equals the number of predicted positions and `TP + FN`
/// the number of gold positions.
pub fn evaluate_example(gold: &TargetFrameMap, predicted: &Prediction) -> PrfCounts {
    let mut counts = PrfCounts::default();
    for (idx, &(_, gold_frame)) in gold {
        match predicted.get(idx) {
            Some(&(_, frame)) if frame == gold_frame => counts.true_pos += 1,
            Some(_) => {
                counts.false_pos += 1;
                counts.false_neg += 1;
            }
            None => counts.false_neg += 1,
        }
    }
    counts.false_pos += predicted.keys().filter(|idx| !gold.contains_key(idx)).count();
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::LexicalUnit;

    fn map(pairs: &[(usize, usize)]) -> TargetFrameMap {
        let lu = LexicalUnit::new(1, 1);
        pairs.iter().map(|&(i, f)| (i, (lu, f))).collect()
    }

    #[test]
    fn test_all_correct_corpus() {
        let mut total = PrfCounts::default();
        total += evaluate_example(&map(&[(0, 3)]), &map(&[(0, 3)]));
        total += evaluate_example(&map(&[(1, 4), (2, 4)]), &map(&[(1, 4), (2, 4)]));
        assert_eq!(total, PrfCounts::new(3, 0, 0));
        let s = total.scores();
        assert_eq!((s.precision, s.recall, s.f1), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_all_wrong_corpus() {
        let mut total = PrfCounts::default();
        total += evaluate_example(&map(&[(0, 3)]), &map(&[(0, 5)]));
        total += evaluate_example(&map(&[(4, 4)]), &map(&[(4, 2)]));
        assert_eq!(total.true_pos, 0);
        assert_eq!(total.scores().f1, 0.0);
    }

    #[test]
    fn test_count_identities() {
        let gold = map(&[(0, 3), (1, 3), (2, 3)]);
        let pred = map(&[(0, 3), (1, 6), (5, 3)]);
        let c = evaluate_example(&gold, &pred);
        assert_eq!(c.predicted(), pred.len());
        assert_eq!(c.gold(), gold.len());
    }

    #[test]
    fn test_zero_denominators() {
        let s = PrfCounts::default().scores();
        assert_eq!(s, PrfScores { precision: 0.0, recall: 0.0, f1: 0.0 });
    }

    #[test]
    fn test_mixed_scores() {
        let c = PrfCounts::new(3, 1, 1);
        let s = c.scores();
        assert!((s.precision - 0.75).abs() < 1e-12);
        assert!((s.recall - 0.75).abs() < 1e-12);
        assert!((s.f1 - 0.75).abs() < 1e-12);
    }
}
