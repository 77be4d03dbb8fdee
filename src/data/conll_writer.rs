// ============================================================
// Layer 4 — Prediction Writers
// ============================================================
// Two output formats, both written atomically:
//   - CoNLL: the input rows again, with the predicted LU and
//     frame in columns 12/13 on target tokens and `_` elsewhere
//   - frame elements (.fes): one SEMAFOR-style line per example

use std::{fmt::Write as _, path::Path};

use anyhow::{ensure, Result};

use crate::data::conll::{EMPTY, FORM_COL, FRAME_COL, LU_COL, ROLE_COL};
use crate::data::dictionaries::Dictionaries;
use crate::domain::example::{Example, Prediction};
use crate::infra::atomic::write_atomic;

/// Render one example's rows with `prediction` substituted in.
pub fn format_predicted_conll(example: &Example, prediction: &Prediction, dicts: &Dictionaries) -> String {
    let mut out = String::new();
    for (position, cols) in example.rows.iter().enumerate() {
        let mut cols = cols.clone();
        match prediction.get(&position) {
            Some(&(lu, frame)) => {
                cols[LU_COL]    = dicts.lu_name(lu);
                cols[FRAME_COL] = dicts.frames.item(frame).to_string();
            }
            None => {
                cols[LU_COL]    = EMPTY.to_string();
                cols[FRAME_COL] = EMPTY.to_string();
            }
        }
        cols[ROLE_COL] = "O".to_string();
        out.push_str(&cols.join("\t"));
        out.push('\n');
    }
    out
}

pub fn write_predicted_conll(
    path:        &Path,
    examples:    &[Example],
    predictions: &[Prediction],
    dicts:       &Dictionaries,
) -> Result<()> {
    ensure!(
        examples.len() == predictions.len(),
        "{} examples but {} predictions",
        examples.len(),
        predictions.len()
    );
    let mut out = String::new();
    for (example, prediction) in examples.iter().zip(predictions) {
        out.push_str(&format_predicted_conll(example, prediction, dicts));
        out.push('\n');
    }
    write_atomic(path, out.as_bytes())?;
    tracing::debug!("Wrote {} predictions to '{}'", predictions.len(), path.display());
    Ok(())
}

/// `rank \t #fes+1 \t frame \t lu \t idx_idx \t word_word \t sent#`
pub fn format_frame_elements(example: &Example, prediction: &Prediction, dicts: &Dictionaries) -> Option<String> {
    let (&_, &(lu, frame)) = prediction.iter().next()?;
    let positions: Vec<String> = prediction.keys().map(usize::to_string).collect();
    let words: Vec<&str> = prediction
        .keys()
        .filter_map(|&i| example.rows.get(i).map(|cols| cols[FORM_COL].as_str()))
        .collect();
    let mut line = String::new();
    let _ = write!(
        line,
        "0\t1\t{}\t{}\t{}\t{}\t{}",
        dicts.frames.item(frame),
        dicts.lu_name(lu),
        positions.join("_"),
        words.join("_"),
        example.sent_num,
    );
    Some(line)
}

pub fn write_frame_elements(
    path:        &Path,
    examples:    &[Example],
    predictions: &[Prediction],
    dicts:       &Dictionaries,
) -> Result<()> {
    let mut out = String::new();
    for (example, prediction) in examples.iter().zip(predictions) {
        if let Some(line) = format_frame_elements(example, prediction, dicts) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    write_atomic(path, out.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::conll::{parse_conll, tests::row};

    fn fixture() -> (Dictionaries, Example) {
        let text = [
            row(1, "Planes", "NNS", 3, "_", "_"),
            row(2, "take", "VBP", 3, "take_off.v", "Departing"),
            row(3, "off", "RP", 3, "take_off.v", "Departing"),
        ]
        .join("\n");
        let mut dicts = Dictionaries::new();
        let mut examples = parse_conll(text.as_bytes(), &mut dicts).unwrap();
        dicts.frames.index("Removing");
        (dicts, examples.remove(0))
    }

    #[test]
    fn test_conll_substitutes_predicted_frame() {
        let (dicts, ex) = fixture();
        let removing = dicts.frames.get("Removing").unwrap();
        let text = format_predicted_conll(&ex, &ex.prediction_for(removing), &dicts);
        let lines: Vec<Vec<&str>> = text.lines().map(|l| l.split('\t').collect()).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0][LU_COL], "_");
        assert_eq!(lines[0][FRAME_COL], "_");
        assert_eq!(lines[1][LU_COL], "take_off.v");
        assert_eq!(lines[1][FRAME_COL], "Removing");
        assert_eq!(lines[2][FRAME_COL], "Removing");
        assert_eq!(lines[1][FORM_COL], "take");
    }

    #[test]
    fn test_frame_elements_line() {
        let (dicts, ex) = fixture();
        let line = format_frame_elements(&ex, &ex.prediction_for(ex.frame), &dicts).unwrap();
        assert_eq!(line, "0\t1\tDeparting\ttake_off.v\t1_2\ttake_off\t3");
    }

    #[test]
    fn test_write_round_trips_through_reader() {
        let (dicts, ex) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.conll");
        write_predicted_conll(&path, &[ex.clone()], &[ex.prediction_for(ex.frame)], &dicts).unwrap();

        let mut fresh = Dictionaries::new();
        let text = std::fs::read_to_string(&path).unwrap();
        let back = parse_conll(text.as_bytes(), &mut fresh).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].target_positions(), ex.target_positions());
        assert_eq!(fresh.frames.item(back[0].frame), "Departing");
    }
}
