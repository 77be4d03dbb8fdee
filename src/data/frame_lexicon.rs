// ============================================================
// Layer 4 — Frame Lexicon Loader
// ============================================================
// Reads `FRAME<TAB>lemma.pos` pairs (one per line, `#` comments)
// and merges them with the (LU, frame) pairs seen in training.
// Must run before the dictionaries are locked: lexicon frames
// and LUs that never occur in training still get ids.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};

use crate::data::dictionaries::Dictionaries;
use crate::data::vocab::UNK_ID;
use crate::domain::errors::CorpusError;
use crate::domain::example::{Example, FrameId};
use crate::domain::lexicon::FrameLexicon;

pub fn load_frame_lexicon(
    path:     &Path,
    dicts:    &mut Dictionaries,
    training: &[Example],
) -> Result<FrameLexicon> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open frame lexicon '{}'", path.display()))?;
    let mut pairs = parse_frame_lexicon(BufReader::new(file), dicts)
        .with_context(|| format!("Cannot read frame lexicon '{}'", path.display()))?;
    let listed = pairs.len();

    pairs.extend(
        training
            .iter()
            .filter(|ex| ex.frame != UNK_ID)
            .map(|ex| (ex.lu.id, ex.frame)),
    );

    let lexicon = FrameLexicon::from_pairs(pairs);
    tracing::info!(
        "Frame lexicon: {} listed pairs, {} lexical units ({} ambiguous)",
        listed,
        lexicon.num_lexical_units(),
        lexicon.num_ambiguous(),
    );
    Ok(lexicon)
}

pub fn parse_frame_lexicon<R: BufRead>(
    reader: R,
    dicts:  &mut Dictionaries,
) -> Result<Vec<(usize, FrameId)>, CorpusError> {
    let mut pairs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bad = || CorpusError::BadLexicalUnit { line: idx + 1, value: line.to_string() };
        let (frame, lu) = line.split_once('\t').ok_or_else(bad)?;
        let (lemma, _pos) = lu
            .trim()
            .rsplit_once('.')
            .filter(|(lemma, pos)| !lemma.is_empty() && !pos.is_empty())
            .ok_or_else(bad)?;
        let lu_id    = dicts.lus.index(lemma);
        let frame_id = dicts.frames.index(frame.trim());
        pairs.push((lu_id, frame_id));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs_and_comments() {
        let text = "# frame\tlu\nMotion\tmove.v\n\nSelf_motion\tmove.v\nSelf_motion\trun.v\n";
        let mut dicts = Dictionaries::new();
        let pairs = parse_frame_lexicon(text.as_bytes(), &mut dicts).unwrap();
        assert_eq!(pairs.len(), 3);

        let lex = FrameLexicon::from_pairs(pairs);
        let move_id = dicts.lus.get("move").unwrap();
        let run_id  = dicts.lus.get("run").unwrap();
        assert_eq!(lex.candidates(move_id).unwrap().len(), 2);
        assert_eq!(lex.related(run_id), Some(&[move_id][..]));
    }

    #[test]
    fn test_malformed_line() {
        let err = parse_frame_lexicon("Motion move.v".as_bytes(), &mut Dictionaries::new())
            .unwrap_err();
        assert!(matches!(err, CorpusError::BadLexicalUnit { line: 1, .. }));
    }
}
