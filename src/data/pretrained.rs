// ============================================================
// Layer 4 — Pretrained Word Vectors
// ============================================================
// GloVe-style text file: `word v1 v2 ... vD` per line.
// Only words already in the (training) token vocabulary are kept;
// the dimension comes from the first line and every other line
// must agree with it.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};

use crate::data::vocab::{Vocab, UNK_ID};
use crate::domain::errors::CorpusError;

#[derive(Debug, Clone, Default)]
pub struct PretrainedVectors {
    dim:     usize,
    vectors: HashMap<usize, Vec<f32>>,
}

impl PretrainedVectors {
    pub fn load(path: &Path, vocab: &Vocab) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Cannot open word vectors '{}'", path.display()))?;
        let vectors = Self::parse(BufReader::new(file), vocab)
            .with_context(|| format!("Cannot read word vectors '{}'", path.display()))?;
        tracing::info!(
            "using pretrained embeddings of dimension {} ({} of {} vocabulary words covered)",
            vectors.dim(),
            vectors.len(),
            vocab.len(),
        );
        Ok(vectors)
    }

    pub fn parse<R: BufRead>(reader: R, vocab: &Vocab) -> Result<Self, CorpusError> {
        let mut dim = None;
        let mut vectors = HashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else { continue };

            let values = fields
                .map(|v| {
                    v.parse::<f32>().map_err(|_| CorpusError::BadNumber {
                        line:  idx + 1,
                        value: v.to_string(),
                    })
                })
                .collect::<Result<Vec<f32>, _>>()?;

            let expected = *dim.get_or_insert(values.len());
            if values.len() != expected {
                return Err(CorpusError::DimensionMismatch {
                    line: idx + 1,
                    expected,
                    found: values.len(),
                });
            }

            match vocab.get(word) {
                Some(id) if id != UNK_ID => {
                    vectors.insert(id, values);
                }
                _ => {}
            }
        }

        Ok(Self { dim: dim.unwrap_or(0), vectors })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn contains(&self, token: usize) -> bool {
        self.vectors.contains_key(&token)
    }

    #[cfg(test)]
    pub fn get(&self, token: usize) -> Option<&[f32]> {
        self.vectors.get(&token).map(Vec::as_slice)
    }

    /// Row-major `[vocab_size, dim]` table; rows without a vector are zero.
    pub fn to_table(&self, vocab_size: usize) -> Vec<f32> {
        let mut table = vec![0.0; vocab_size * self.dim];
        for (&token, vector) in &self.vectors {
            if token < vocab_size {
                table[token * self.dim..(token + 1) * self.dim].copy_from_slice(vector);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocab {
        let mut v = Vocab::new("tokens");
        v.index("the");
        v.index("dog");
        v
    }

    #[test]
    fn test_keeps_only_vocabulary_words() {
        let text = "the 0.1 0.2\ncat 0.3 0.4\ndog 0.5 0.6\n";
        let vecs = PretrainedVectors::parse(text.as_bytes(), &vocab()).unwrap();
        assert_eq!(vecs.dim(), 2);
        assert_eq!(vecs.len(), 2);
        assert_eq!(vecs.get(2), Some(&[0.5, 0.6][..]));
        assert!(!vecs.contains(UNK_ID));
    }

    #[test]
    fn test_dimension_mismatch() {
        let text = "the 0.1 0.2\ndog 0.5\n";
        let err = PretrainedVectors::parse(text.as_bytes(), &vocab()).unwrap_err();
        assert!(matches!(err, CorpusError::DimensionMismatch { line: 2, expected: 2, found: 1 }));
    }

    #[test]
    fn test_table_layout() {
        let text = "dog 1 2\n";
        let vecs = PretrainedVectors::parse(text.as_bytes(), &vocab()).unwrap();
        assert_eq!(vecs.to_table(3), vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0]);
    }
}
