/**
This module contains the output side of the evaluation: the scores themselves and the two
optional listings (the label assignment and the substituted predictions). Every type
serializes with serde and displays in the same textual formats the persisted files use, so
a report can be consumed programmatically, printed or written next to the prediction file
without any further formatting.
*/
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;

/// The three evaluation metrics together with the number of gold standard words they were
/// normalized by.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
    pub word_count: usize,
}

impl Scores {
    /// The scores as a single `precision<TAB>recall<TAB>fmeasure` line, for machine
    /// consumption.
    pub fn to_tsv(&self) -> String {
        format!("{}\t{}\t{}", self.precision, self.recall, self.fmeasure)
    }
}

impl Display for Scores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "precision: {}", self.precision)?;
        writeln!(f, "recall   : {}", self.recall)?;
        write!(f, "fmeasure : {}", self.fmeasure)
    }
}

/// One matched pair of the global label assignment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentPair {
    pub gold: String,
    pub pred: String,
}

/// The global label assignment, sorted by gold standard label. Displays in the listing
/// format persisted next to the prediction file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssignmentListing {
    pairs: Vec<AssignmentPair>,
}

impl AssignmentListing {
    /// Builds the listing from the predicted-to-gold assignment map, reordered by gold
    /// standard label.
    pub fn from_assignment(assignment: &BTreeMap<String, String>) -> Self {
        let mut pairs: Vec<AssignmentPair> = assignment
            .iter()
            .map(|(pred, gold)| AssignmentPair {
                gold: gold.clone(),
                pred: pred.clone(),
            })
            .collect();
        pairs.sort();
        AssignmentListing { pairs }
    }

    pub fn pairs(&self) -> &[AssignmentPair] {
        &self.pairs
    }
}

impl Display for AssignmentListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "#############################################")?;
        writeln!(f, "# gold standard labels\t=>\tpredicted labels")?;
        writeln!(f, "#############################################")?;
        for pair in &self.pairs {
            writeln!(f, "{}\t=>\t{}", pair.gold, pair.pred)?;
        }
        Ok(())
    }
}

/// One word of the substituted prediction listing, its analyses already rewritten with the
/// assigned gold standard labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutedWord {
    pub word: String,
    pub analyses: Vec<String>,
}

/// The predictions rewritten with their assigned gold standard labels, one word per line in
/// the corpus format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubstitutedListing {
    words: Vec<SubstitutedWord>,
}

impl SubstitutedListing {
    pub fn new(words: Vec<SubstitutedWord>) -> Self {
        SubstitutedListing { words }
    }

    pub fn words(&self) -> &[SubstitutedWord] {
        &self.words
    }
}

impl Display for SubstitutedListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for word in &self.words {
            writeln!(f, "{}\t{}", word.word, word.analyses.join(", "))?;
        }
        Ok(())
    }
}

/// The complete outcome of one evaluation. The listings are present exactly when the
/// configuration asked for them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvalReport {
    pub scores: Scores,
    pub assignment: Option<AssignmentListing>,
    pub substituted: Option<SubstitutedListing>,
}

impl EvalReport {
    /// Writes the listings present in this report next to the prediction file, as
    /// `<prediction>.assignment` and `<prediction>.result`. A report without listings writes
    /// nothing.
    pub fn persist(&self, pred_path: &Path) -> io::Result<()> {
        if let Some(assignment) = &self.assignment {
            fs::write(suffixed(pred_path, ".assignment"), assignment.to_string())?;
        }
        if let Some(substituted) = &self.substituted {
            fs::write(suffixed(pred_path, ".result"), substituted.to_string())?;
        }
        Ok(())
    }
}

/// Appends a suffix to a full path, keeping any existing extension.
fn suffixed(path: &Path, suffix: &str) -> OsString {
    let mut out = OsString::from(path.as_os_str());
    out.push(suffix);
    out
}
