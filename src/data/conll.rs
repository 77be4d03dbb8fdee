// ============================================================
// Layer 4 — CoNLL Corpus Reader
// ============================================================
// Reads the 15-column CoNLL-2009 style files used for FrameNet
// frame identification. One blank-line separated block is one
// annotated target:
//
//   0 id   1 form   2 lemma   3 plemma   4 fn-pos   5 ppos
//   6 sent#   7 feat   8 head   9 phead   10 deprel  11 pdeprel
//   12 LU (lemma.pos or _)   13 frame (or _)   14 role
//
// Tokens carrying an LU form the target. A target with no frame
// (raw prediction input) gets the UNK frame.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};

use crate::data::dictionaries::Dictionaries;
use crate::data::vocab::UNK_ID;
use crate::domain::errors::CorpusError;
use crate::domain::example::{Example, LexicalUnit, TargetFrameMap};

pub const NUM_COLUMNS: usize = 15;
pub const EMPTY: &str = "_";

pub const FORM_COL: usize = 1;
pub const POS_COL: usize = 5;
pub const SENT_COL: usize = 6;
pub const LU_COL: usize = 12;
pub const FRAME_COL: usize = 13;
pub const ROLE_COL: usize = 14;

/// A source of annotated examples.
///
/// Strings are mapped to ids through `dicts`; before the dictionaries
/// are locked new ids are created, afterwards unknown items become UNK.
pub trait CorpusSource {
    fn load(&self, dicts: &mut Dictionaries) -> Result<Vec<Example>>;
}

/// A CoNLL file on disk.
pub struct ConllCorpus {
    path: PathBuf,
}

impl ConllCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CorpusSource for ConllCorpus {
    fn load(&self, dicts: &mut Dictionaries) -> Result<Vec<Example>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open corpus '{}'", self.path.display()))?;
        let examples = parse_conll(BufReader::new(file), dicts)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))?;
        tracing::info!("Read {} examples from '{}'", examples.len(), self.path.display());
        Ok(examples)
    }
}

/// Parse every example in `reader`, indexing strings through `dicts`.
pub fn parse_conll<R: BufRead>(
    reader: R,
    dicts:  &mut Dictionaries,
) -> Result<Vec<Example>, CorpusError> {
    let mut examples = Vec::new();
    let mut block: Vec<Vec<String>> = Vec::new();
    let mut line_no = 0;

    for line in reader.lines() {
        let line = line?;
        line_no += 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            if !block.is_empty() {
                examples.push(build_example(std::mem::take(&mut block), dicts, line_no)?);
            }
            continue;
        }
        let cols: Vec<String> = trimmed.split('\t').map(str::to_string).collect();
        if cols.len() != NUM_COLUMNS {
            return Err(CorpusError::ColumnCount {
                line:     line_no,
                expected: NUM_COLUMNS,
                found:    cols.len(),
            });
        }
        block.push(cols);
    }
    if !block.is_empty() {
        examples.push(build_example(block, dicts, line_no)?);
    }
    Ok(examples)
}

fn build_example(
    rows:    Vec<Vec<String>>,
    dicts:   &mut Dictionaries,
    line_no: usize,
) -> Result<Example, CorpusError> {
    let mut tokens  = Vec::with_capacity(rows.len());
    let mut postags = Vec::with_capacity(rows.len());
    let mut targets = TargetFrameMap::new();

    let sent_field = &rows[0][SENT_COL];
    let sent_num = sent_field.parse::<usize>().map_err(|_| CorpusError::BadNumber {
        line:  line_no,
        value: sent_field.clone(),
    })?;

    for (position, cols) in rows.iter().enumerate() {
        tokens.push(dicts.tokens.index(&cols[FORM_COL].to_lowercase()));
        postags.push(dicts.postags.index(&cols[POS_COL]));

        let lu_field = &cols[LU_COL];
        if lu_field == EMPTY {
            continue;
        }
        let (lemma, pos) = lu_field
            .rsplit_once('.')
            .filter(|(lemma, pos)| !lemma.is_empty() && !pos.is_empty())
            .ok_or_else(|| CorpusError::BadLexicalUnit {
                line:  line_no,
                value: lu_field.clone(),
            })?;
        let lu = LexicalUnit::new(dicts.lus.index(lemma), dicts.lu_pos.index(pos));
        let frame = match cols[FRAME_COL].as_str() {
            EMPTY => UNK_ID,
            name  => dicts.frames.index(name),
        };
        targets.insert(position, (lu, frame));
    }

    Example::new(tokens, postags, targets, sent_num, rows)
        .map_err(|source| CorpusError::InvalidExample { line: line_no, source })
}

/// Log the share of examples whose target spans more than one token.
pub fn report_multi_token_targets(examples: &[Example], split: &str) {
    let total = examples.len();
    let multi = examples.iter().filter(|e| e.is_multi_token()).count();
    let pct = if total == 0 { 0.0 } else { multi as f64 * 100.0 / total as f64 };
    tracing::info!("multi-token targets in {}: {:.3}% [{} / {}]", split, pct, multi, total);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::errors::ExampleError;

    pub(crate) fn row(id: usize, form: &str, pos: &str, sent: usize, lu: &str, frame: &str) -> String {
        format!(
            "{id}\t{form}\t_\t{lemma}\t{pos}\t{pos}\t{sent}\t_\t_\t_\t_\t_\t{lu}\t{frame}\tO",
            lemma = form.to_lowercase()
        )
    }

    #[test]
    fn test_parse_two_blocks() {
        let text = [
            row(1, "The", "DT", 0, "_", "_"),
            row(2, "dog", "NN", 0, "_", "_"),
            row(3, "ran", "VBD", 0, "run.v", "Self_motion"),
            String::new(),
            row(1, "Take", "VB", 1, "take_off.v", "Departing"),
            row(2, "off", "RP", 1, "take_off.v", "Departing"),
            String::new(),
        ]
        .join("\n");

        let mut dicts = Dictionaries::new();
        let examples = parse_conll(text.as_bytes(), &mut dicts).unwrap();
        assert_eq!(examples.len(), 2);

        let first = &examples[0];
        assert_eq!(first.tokens.len(), 3);
        assert_eq!(first.target_positions(), vec![2]);
        assert_eq!(dicts.frames.item(first.frame), "Self_motion");
        assert_eq!(dicts.lu_name(first.lu), "run.v");
        assert_eq!(first.tokens[0], dicts.tokens.get("the").unwrap());

        let second = &examples[1];
        assert!(second.is_multi_token());
        assert_eq!(second.sent_num, 1);
    }

    #[test]
    fn test_inconsistent_block_aborts() {
        let text = [
            row(1, "Take", "VB", 1, "take_off.v", "Departing"),
            row(2, "off", "RP", 1, "take_off.v", "Removing"),
        ]
        .join("\n");
        let err = parse_conll(text.as_bytes(), &mut Dictionaries::new()).unwrap_err();
        match err {
            CorpusError::InvalidExample { source: ExampleError::InconsistentFrames { targets }, .. } => {
                assert_eq!(targets.len(), 2)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_locked_dicts_map_unknowns() {
        let train = row(1, "ran", "VBD", 0, "run.v", "Self_motion");
        let mut dicts = Dictionaries::new();
        parse_conll(train.as_bytes(), &mut dicts).unwrap();
        dicts.lock();

        let dev = row(1, "sprinted", "VBD", 0, "sprint.v", "Self_motion");
        let examples = parse_conll(dev.as_bytes(), &mut dicts).unwrap();
        assert_eq!(examples[0].tokens[0], UNK_ID);
        assert_eq!(examples[0].lu.id, UNK_ID);
        assert_eq!(dicts.tokens.num_unks(), 1);
        assert_eq!(dicts.lus.num_unks(), 1);
        assert_eq!(dicts.frames.num_unks(), 0);
    }

    #[test]
    fn test_missing_frame_becomes_unk() {
        let text = row(1, "ran", "VBD", 0, "run.v", "_");
        let examples = parse_conll(text.as_bytes(), &mut Dictionaries::new()).unwrap();
        assert_eq!(examples[0].frame, UNK_ID);
    }

    #[test]
    fn test_bad_column_count() {
        let err = parse_conll("1\tdog\tNN".as_bytes(), &mut Dictionaries::new()).unwrap_err();
        assert!(matches!(err, CorpusError::ColumnCount { line: 1, found: 3, .. }));
    }

    #[test]
    fn test_bad_lexical_unit() {
        let text = row(1, "ran", "VBD", 0, "run", "Self_motion");
        let err = parse_conll(text.as_bytes(), &mut Dictionaries::new()).unwrap_err();
        assert!(matches!(err, CorpusError::BadLexicalUnit { .. }));
    }
}
