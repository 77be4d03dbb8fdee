// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// String ↔ dense id mapping with an explicit two-phase life:
//
//   Open   → `index` creates ids on demand
//   Locked → `index` returns the existing id or UNK, counting
//            every UNK it hands out; `add` is rejected
//
// Embedding tables are sized from `len()` after locking, so a
// locked vocabulary never grows.

use std::collections::HashMap;

use crate::domain::errors::VocabError;

pub const UNK: &str = "<UNK>";
pub const UNK_ID: usize = 0;

#[derive(Debug, Clone)]
pub struct Vocab {
    name:     String,
    ids:      HashMap<String, usize>,
    items:    Vec<String>,
    locked:   bool,
    unknowns: usize,
}

impl Vocab {
    /// New open vocabulary with UNK already at id 0.
    pub fn new(name: impl Into<String>) -> Self {
        let mut ids = HashMap::new();
        ids.insert(UNK.to_string(), UNK_ID);
        Self {
            name:     name.into(),
            ids,
            items:    vec![UNK.to_string()],
            locked:   false,
            unknowns: 0,
        }
    }

    /// Get-or-create. Fails once the vocabulary is locked.
    pub fn add(&mut self, item: &str) -> Result<usize, VocabError> {
        if let Some(&id) = self.ids.get(item) {
            return Ok(id);
        }
        if self.locked {
            return Err(VocabError::Locked {
                vocab: self.name.clone(),
                item:  item.to_string(),
            });
        }
        let id = self.items.len();
        self.ids.insert(item.to_string(), id);
        self.items.push(item.to_string());
        Ok(id)
    }

    /// Phase-dependent lookup: creates ids while open, maps to UNK once locked.
    pub fn index(&mut self, item: &str) -> usize {
        match self.add(item) {
            Ok(id) => id,
            Err(_) => {
                self.unknowns += 1;
                UNK_ID
            }
        }
    }

    pub fn get(&self, item: &str) -> Option<usize> {
        self.ids.get(item).copied()
    }

    /// The string for `id`, or UNK for an id outside the vocabulary.
    pub fn item(&self, id: usize) -> &str {
        self.items.get(id).map(String::as_str).unwrap_or(UNK)
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    #[cfg(test)]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of unknown lookups since locking.
    pub fn num_unks(&self) -> usize {
        self.unknowns
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unk_reserved() {
        let v = Vocab::new("tok");
        assert_eq!(v.len(), 1);
        assert_eq!(v.get(UNK), Some(UNK_ID));
        assert_eq!(v.item(UNK_ID), UNK);
    }

    #[test]
    fn test_open_phase_grows() {
        let mut v = Vocab::new("tok");
        let a = v.index("cat");
        let b = v.index("dog");
        assert_eq!(v.index("cat"), a);
        assert_ne!(a, b);
        assert_eq!(v.len(), 3);
        assert_eq!(v.num_unks(), 0);
    }

    #[test]
    fn test_locked_maps_unknowns_to_unk() {
        let mut v = Vocab::new("tok");
        let cat = v.index("cat");
        v.lock();
        assert_eq!(v.index("cat"), cat);
        assert_eq!(v.index("zebra"), UNK_ID);
        assert_eq!(v.index("okapi"), UNK_ID);
        assert_eq!(v.len(), 2);
        assert_eq!(v.num_unks(), 2);
    }

    #[test]
    fn test_locked_rejects_add() {
        let mut v = Vocab::new("frames");
        v.lock();
        let err = v.add("Motion").unwrap_err();
        assert_eq!(err, VocabError::Locked { vocab: "frames".into(), item: "Motion".into() });
    }
}
