use crate::data::vocab::Vocab;

/// The five vocabularies the model is sized from.
#[derive(Debug, Clone)]
pub struct Dictionaries {
    pub tokens:  Vocab,
    pub postags: Vocab,
    pub lus:     Vocab,
    pub lu_pos:  Vocab,
    pub frames:  Vocab,
}

impl Default for Dictionaries {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionaries {
    pub fn new() -> Self {
        Self {
            tokens:  Vocab::new("tokens"),
            postags: Vocab::new("postags"),
            lus:     Vocab::new("lexical-units"),
            lu_pos:  Vocab::new("lu-postags"),
            frames:  Vocab::new("frames"),
        }
    }

    /// Freeze every vocabulary. Must happen before the model is built.
    pub fn lock(&mut self) {
        for vocab in self.all_mut() {
            vocab.lock();
        }
    }

    #[cfg(test)]
    pub fn is_locked(&self) -> bool {
        self.all().iter().all(|v| v.is_locked())
    }

    /// `lemma.pos` string for a lexical unit.
    pub fn lu_name(&self, lu: crate::domain::example::LexicalUnit) -> String {
        format!("{}.{}", self.lus.item(lu.id), self.lu_pos.item(lu.pos_id))
    }

    pub fn log_sizes(&self) {
        tracing::info!("# words in vocab: {}", self.tokens.len());
        tracing::info!("# POS tags: {}", self.postags.len());
        tracing::info!("# lexical units: {}", self.lus.len());
        tracing::info!("# LU POS tags: {}", self.lu_pos.len());
        tracing::info!("# frames: {}", self.frames.len());
    }

    pub fn log_unknowns(&self) {
        for vocab in self.all() {
            tracing::info!("# unseen, unlearnt {} at test time: {}", vocab.name(), vocab.num_unks());
        }
    }

    fn all(&self) -> [&Vocab; 5] {
        [&self.tokens, &self.postags, &self.lus, &self.lu_pos, &self.frames]
    }

    fn all_mut(&mut self) -> [&mut Vocab; 5] {
        [&mut self.tokens, &mut self.postags, &mut self.lus, &mut self.lu_pos, &mut self.frames]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::LexicalUnit;

    #[test]
    fn test_lock_freezes_all() {
        let mut d = Dictionaries::new();
        d.frames.index("Motion");
        assert!(!d.is_locked());
        d.lock();
        assert!(d.is_locked());
        assert!(d.frames.add("Arriving").is_err());
    }

    #[test]
    fn test_lu_name() {
        let mut d = Dictionaries::new();
        let lu = LexicalUnit::new(d.lus.index("run"), d.lu_pos.index("v"));
        assert_eq!(d.lu_name(lu), "run.v");
    }
}
