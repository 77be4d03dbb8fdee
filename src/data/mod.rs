// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between files on disk and id-level examples:
//
//   train .conll ──► ConllCorpus ──► Vocab (open) ──► Example
//   frame lexicon ─► FrameLexicon                       │
//   word vectors ──► PretrainedVectors                  │
//                    Dictionaries::lock()               │
//   dev/test .conll ► ConllCorpus ──► Vocab (locked) ───┘
//
// and back out again as CoNLL / frame-element predictions.

/// Two-phase string ↔ id vocabulary
pub mod vocab;

/// The five vocabularies together
pub mod dictionaries;

/// CoNLL-2009 style corpus reader
pub mod conll;

/// CoNLL and frame-element prediction writers
pub mod conll_writer;

/// LU → frames resource loader
pub mod frame_lexicon;

/// GloVe-format pretrained vectors
pub mod pretrained;

/// Training set shuffling and UNK substitution
pub mod dataset;
