// ============================================================
// Layer 6 — Prediction Analysis Log
// ============================================================
// Human-readable dump of a test run, grouped by sentence:
//
//   Sent#12 :
//   Planes take off .
//   gold:       Departing  take_off.v  take off
//   prediction: Departing  take_off.v  take off
//   1.0 / 1.0 / 1.0
//   Sentence ID=12 Total: 1.0 / 1.0 / 1.0   Recall=1.0 Precision=1.0 Fscore=1.0
//
// The totals line counts only the sentence it closes. Opened once per
// test run, appended to per example, closed by `finish`.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::data::conll::FORM_COL;
use crate::data::dictionaries::Dictionaries;
use crate::domain::evaluation::PrfCounts;
use crate::domain::example::{Example, TargetFrameMap};

pub struct AnalysisLog {
    out:      BufWriter<File>,
    sentence: Option<usize>,
    totals:   PrfCounts,
}

impl AnalysisLog {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Cannot create analysis log '{}'", path.display()))?;
        tracing::debug!("Writing prediction analysis to '{}'", path.display());
        Ok(Self { out: BufWriter::new(file), sentence: None, totals: PrfCounts::default() })
    }

    pub fn record(
        &mut self,
        example:    &Example,
        prediction: &TargetFrameMap,
        counts:     PrfCounts,
        dicts:      &Dictionaries,
    ) -> Result<()> {
        if self.sentence != Some(example.sent_num) {
            self.close_sentence()?;
            self.sentence = Some(example.sent_num);
            let words: Vec<&str> = example.rows.iter().map(|cols| cols[FORM_COL].as_str()).collect();
            writeln!(self.out, "Sent#{} :", example.sent_num)?;
            writeln!(self.out, "{}", words.join(" "))?;
        }

        writeln!(self.out, "gold:       {}", describe(example, &example.targets, dicts))?;
        writeln!(self.out, "prediction: {}", describe(example, prediction, dicts))?;
        writeln!(
            self.out,
            "{:.1} / {:.1} / {:.1}",
            counts.true_pos as f64,
            counts.predicted() as f64,
            counts.gold() as f64,
        )?;
        self.totals += counts;
        Ok(())
    }

    /// Flush the last sentence's totals and the file.
    pub fn finish(mut self) -> Result<()> {
        self.close_sentence()?;
        self.out.flush()?;
        Ok(())
    }

    fn close_sentence(&mut self) -> Result<()> {
        let Some(sent_num) = self.sentence.take() else {
            return Ok(());
        };
        let t = std::mem::take(&mut self.totals);
        let s = t.scores();
        writeln!(
            self.out,
            "Sentence ID={} Total: {:.1} / {:.1} / {:.1}   Recall={:.4} Precision={:.4} Fscore={:.4}\n",
            sent_num,
            t.true_pos as f64,
            t.predicted() as f64,
            t.gold() as f64,
            s.recall,
            s.precision,
            s.f1,
        )?;
        Ok(())
    }
}

/// `frame  lemma.pos  target words`, or `_` when nothing was assigned.
fn describe(example: &Example, map: &TargetFrameMap, dicts: &Dictionaries) -> String {
    let Some((_, &(lu, frame))) = map.iter().next() else {
        return "_".to_string();
    };
    let words: Vec<&str> = map
        .keys()
        .filter_map(|&i| example.rows.get(i).map(|cols| cols[FORM_COL].as_str()))
        .collect();
    format!("{}  {}  {}", dicts.frames.item(frame), dicts.lu_name(lu), words.join(" "))
}
