/**
This module computes the evaluation metrics (precision, recall, f-measure) of a predicted
analysis set against a gold standard analysis set.

The computation happens in two matching steps. First, a global assignment of predicted
morpheme labels to gold standard labels is derived from a corpus-wide co-occurrence matrix:
the matrix accumulates, for every word both sets analyze, the expected joint occurrence of
each (gold label, predicted label) pair under a uniform choice over the alternative analyses.
A maximum-weight matching of that matrix fixes the label assignment, and every predicted
segmentation is rewritten with its assigned gold labels. Second, for words with several
alternative analyses on either side, the alternatives themselves are paired up by another
maximum-weight matching over their multiset overlaps, and only the paired combinations are
scored. Giving too few or too many alternatives is thereby punished.
*/
use crate::config::EvalConfig;
use crate::matching::{maximum_weight_matching, Matching};
use crate::reporter::{
    AssignmentListing, EvalReport, Scores, SubstitutedListing, SubstitutedWord,
};
use crate::vocab::Vocabulary;
use ahash::AHashMap;
use itertools::iproduct;
use log::debug;
use morpheme_parsing::{Analyses, ParsingError, Segmentation};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;

#[derive(Debug)]
/// Enum error encompassing the failures that can happen when computing the precision, recall
/// and f-measure of two analysis sets.
pub enum ComputationError {
    /// One of the corpus files is malformed.
    Parsing(ParsingError),
    /// A word carries no analysis at all. Well-formed input always has at least one
    /// alternative per word, so this is a configuration error, not a scoring outcome.
    MissingAnalyses(String),
    /// A segmentation used as the consumed side of an overlap is empty, which would divide
    /// by zero.
    EmptySegmentation(String),
    /// Reading a corpus or persisting a listing failed.
    Io(std::io::Error),
}

impl Display for ComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsing(parse_err) => Display::fmt(parse_err, f),
            Self::MissingAnalyses(word) => {
                write!(f, "Word {} has no analysis on one side; it was not evaluated", word)
            }
            Self::EmptySegmentation(word) => {
                write!(f, "Word {} has an empty segmentation; it was not evaluated", word)
            }
            Self::Io(io_err) => Display::fmt(io_err, f),
        }
    }
}

impl Error for ComputationError {}

impl From<ParsingError> for ComputationError {
    fn from(value: ParsingError) -> Self {
        Self::Parsing(value)
    }
}

impl From<std::io::Error> for ComputationError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Builds the gold x predicted label co-occurrence matrix. For every word present in both
/// analysis sets, each (gold label, predicted label) pair drawn from one gold alternative and
/// one predicted alternative contributes `1 / (#gold alternatives * #predicted alternatives)`.
/// Words present only in the gold standard are excluded here; they still count toward the
/// word count in the scorer.
pub(crate) fn cooccurrence_matrix(
    gold: &Analyses,
    pred: &Analyses,
    gold_vocab: &Vocabulary,
    pred_vocab: &Vocabulary,
) -> Result<Array2<f64>, ComputationError> {
    let mut matrix = Array2::<f64>::zeros((gold_vocab.len(), pred_vocab.len()));
    for (word, gold_alternatives) in gold.iter() {
        let Some(pred_alternatives) = pred.get(word) else {
            continue;
        };
        let combinations = gold_alternatives.len() * pred_alternatives.len();
        if combinations == 0 {
            return Err(ComputationError::MissingAnalyses(String::from(word)));
        }
        let ratio = 1.0 / combinations as f64;
        for (gold_alt, pred_alt) in iproduct!(gold_alternatives, pred_alternatives) {
            for (gold_label, pred_label) in iproduct!(gold_alt.iter(), pred_alt.iter()) {
                let row = gold_vocab
                    .index_of(gold_label)
                    .expect("gold label drawn from the gold vocabulary's own analysis set");
                let col = pred_vocab
                    .index_of(pred_label)
                    .expect("predicted label drawn from the predicted vocabulary's own analysis set");
                matrix[[row, col]] += ratio;
            }
        }
    }
    Ok(matrix)
}

/// Translates the global matching back into labels: a map from predicted label to its
/// assigned gold standard label, defined only for matched labels.
pub(crate) fn assignment_map(
    matching: &Matching,
    gold_vocab: &Vocabulary,
    pred_vocab: &Vocabulary,
) -> BTreeMap<String, String> {
    matching
        .iter()
        .map(|&(row, col)| {
            (
                String::from(pred_vocab.label(col)),
                String::from(gold_vocab.label(row)),
            )
        })
        .collect()
}

/// Rewrites a predicted segmentation using the global label assignment: every label present
/// as a key is replaced by its gold standard match, every other label passes through
/// unchanged.
pub fn substitute_labels(
    segmentation: &Segmentation,
    assignment: &BTreeMap<String, String>,
) -> Segmentation {
    segmentation
        .iter()
        .map(|label| match assignment.get(label) {
            Some(gold_label) => gold_label.clone(),
            None => label.clone(),
        })
        .collect()
}

/// The multiset overlap primitive of the evaluation: scans `reference` in order and consumes
/// at most one unused occurrence of each element from `candidate`, then divides the number of
/// consumed elements by the length of `candidate`. The two metric directions swap the roles
/// of the arguments, the measure is deliberately not symmetric. An empty candidate is a
/// configuration error, not a silent zero.
pub(crate) fn overlap_ratio(
    reference: &Segmentation,
    candidate: &Segmentation,
    word: &str,
) -> Result<f64, ComputationError> {
    if candidate.is_empty() {
        return Err(ComputationError::EmptySegmentation(String::from(word)));
    }
    let mut unused: AHashMap<&str, usize> = AHashMap::default();
    for label in candidate.iter() {
        *unused.entry(label.as_str()).or_insert(0) += 1;
    }
    let mut found = 0usize;
    for label in reference.iter() {
        if let Some(count) = unused.get_mut(label.as_str()) {
            if *count > 0 {
                *count -= 1;
                found += 1;
            }
        }
    }
    Ok(found as f64 / candidate.len() as f64)
}

/// Running totals of the evaluation: a pure fold over the (gold alternative, substituted
/// predicted alternative) pairs selected by the matchers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct ScoreAccumulator {
    precision_count: f64,
    recall_count: f64,
}

impl ScoreAccumulator {
    /// Adds the contribution of one assigned pair. The precision fraction is the overlap of
    /// the substituted prediction measured against the gold segmentation, scaled by the
    /// inverse number of predicted alternatives; the recall fraction swaps the overlap roles
    /// and scales by the inverse number of gold alternatives.
    pub(crate) fn add_pair(
        &mut self,
        word: &str,
        gold: &Segmentation,
        pred_substituted: &Segmentation,
        gold_alternatives: usize,
        pred_alternatives: usize,
    ) -> Result<(), ComputationError> {
        let precision_fraction =
            overlap_ratio(gold, pred_substituted, word)? / pred_alternatives as f64;
        let recall_fraction =
            overlap_ratio(pred_substituted, gold, word)? / gold_alternatives as f64;
        debug!(
            "{}: p+={} r+={} gold: [{}] pred: [{}]",
            word, precision_fraction, recall_fraction, gold, pred_substituted
        );
        self.precision_count += precision_fraction;
        self.recall_count += recall_fraction;
        Ok(())
    }

    /// Normalizes the accumulated fractions by the number of gold standard words and derives
    /// the f-measure as the harmonic mean of precision and recall, zero when both are zero.
    pub(crate) fn finalize(self, word_count: usize) -> Scores {
        if word_count == 0 {
            return Scores::default();
        }
        let precision = self.precision_count / word_count as f64;
        let recall = self.recall_count / word_count as f64;
        let fmeasure = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Scores {
            precision,
            recall,
            fmeasure,
            word_count,
        }
    }
}

/// Pairs up the alternatives of a single word: the overlap of every gold alternative against
/// every substituted predicted alternative fills a small matrix, and the maximum-weight
/// matching of that matrix decides which combinations are scored.
fn match_alternatives(
    word: &str,
    gold_alternatives: &[Segmentation],
    pred_substituted: &[Segmentation],
) -> Result<Matching, ComputationError> {
    let mut overlaps =
        Array2::<f64>::zeros((gold_alternatives.len(), pred_substituted.len()));
    for (i, j) in iproduct!(0..gold_alternatives.len(), 0..pred_substituted.len()) {
        overlaps[[i, j]] = overlap_ratio(&gold_alternatives[i], &pred_substituted[j], word)?;
    }
    Ok(maximum_weight_matching(&overlaps))
}

/// Main entrypoint of the Rumma library. Evaluates a predicted analysis set against a gold
/// standard analysis set and returns the scores, together with the label assignment listing
/// and the substituted prediction listing when the configuration asks for them.
///
/// * `gold`: Gold standard analysis set.
/// * `pred`: Predicted analysis set. Words absent from the gold standard are ignored.
/// * `config`: Flags controlling the listings and the diagnostic output.
pub fn evaluation_report(
    gold: &Analyses,
    pred: &Analyses,
    config: &EvalConfig,
) -> Result<EvalReport, ComputationError> {
    let gold_words = gold.word_set();
    let pred_kept = pred.restrict_to(&gold_words);
    let gold_vocab = Vocabulary::from_analyses(gold);
    let pred_vocab = Vocabulary::from_analyses(&pred_kept);
    let matrix = cooccurrence_matrix(gold, &pred_kept, &gold_vocab, &pred_vocab)?;
    let global_matching = maximum_weight_matching(&matrix);
    let assignment = assignment_map(&global_matching, &gold_vocab, &pred_vocab);
    if config.verbose {
        for (pred_label, gold_label) in assignment.iter() {
            debug!("assignment: {} => {}", gold_label, pred_label);
        }
    }

    let mut accumulator = ScoreAccumulator::default();
    let mut substituted_words = Vec::new();
    for (word, gold_alternatives) in gold.iter() {
        let Some(pred_alternatives) = pred_kept.get(word) else {
            // A gold word the prediction does not analyze contributes zero to both
            // accumulators but still counts toward the word count.
            continue;
        };
        let gold_count = gold_alternatives.len();
        let pred_count = pred_alternatives.len();
        if gold_count == 0 || pred_count == 0 {
            return Err(ComputationError::MissingAnalyses(String::from(word)));
        }
        let substituted: Vec<Segmentation> = pred_alternatives
            .iter()
            .map(|segmentation| substitute_labels(segmentation, &assignment))
            .collect();
        if gold_count == 1 && pred_count == 1 {
            accumulator.add_pair(
                word,
                &gold_alternatives[0],
                &substituted[0],
                gold_count,
                pred_count,
            )?;
        } else {
            let pairing = match_alternatives(word, gold_alternatives, &substituted)?;
            for (i, j) in pairing {
                accumulator.add_pair(
                    word,
                    &gold_alternatives[i],
                    &substituted[j],
                    gold_count,
                    pred_count,
                )?;
            }
        }
        if config.save_result {
            substituted_words.push(SubstitutedWord {
                word: String::from(word),
                analyses: substituted.iter().map(|s| s.to_string()).collect(),
            });
        }
    }

    let scores = accumulator.finalize(gold.len());
    if config.verbose {
        debug!(
            "precision (p) = p count / word count = {} / {} = {}",
            accumulator.precision_count, scores.word_count, scores.precision
        );
        debug!(
            "recall    (r) = r count / word count = {} / {} = {}",
            accumulator.recall_count, scores.word_count, scores.recall
        );
        debug!("f-measure (f) = 2 * p * r / (p + r)  = {}", scores.fmeasure);
    }
    let assignment_listing = config
        .save_assignment
        .then(|| AssignmentListing::from_assignment(&assignment));
    let substituted_listing = config
        .save_result
        .then(|| SubstitutedListing::new(substituted_words));
    Ok(EvalReport {
        scores,
        assignment: assignment_listing,
        substituted: substituted_listing,
    })
}

/// Evaluates two corpus files. The listings requested by the configuration are persisted
/// beside the prediction file, as `<prediction>.assignment` and `<prediction>.result`.
///
/// * `gold_path`: Path of the gold standard corpus.
/// * `pred_path`: Path of the predicted corpus.
/// * `config`: Flags controlling the listings and the diagnostic output.
pub fn evaluation_report_files(
    gold_path: &Path,
    pred_path: &Path,
    config: &EvalConfig,
) -> Result<EvalReport, ComputationError> {
    let gold_text = fs::read_to_string(gold_path)?;
    let pred_text = fs::read_to_string(pred_path)?;
    let gold: Analyses = gold_text.parse()?;
    let pred: Analyses = pred_text.parse()?;
    let report = evaluation_report(&gold, &pred, config)?;
    report.persist(pred_path)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use morpheme_parsing::parse_analyses;

    fn close_enough(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-12
    }

    #[test]
    fn test_identical_corpora_score_one() {
        let gold = parse_analyses("cat\tc a t\ndogs\td o g s\n").unwrap();
        let report = evaluation_report(&gold, &gold, &EvalConfig::default()).unwrap();
        assert_eq!(report.scores.precision, 1.0);
        assert_eq!(report.scores.recall, 1.0);
        assert_eq!(report.scores.fmeasure, 1.0);
        assert_eq!(report.scores.word_count, 2);
    }

    #[test]
    fn test_renamed_labels_score_one() {
        // The label assignment makes the spelling of the predicted labels irrelevant; a
        // structurally identical prediction under different names is perfect.
        let gold = parse_analyses("cat\tc a t\n").unwrap();
        let pred = parse_analyses("cat\tx y z\n").unwrap();
        let report = evaluation_report(&gold, &pred, &EvalConfig::default()).unwrap();
        assert_eq!(report.scores.precision, 1.0);
        assert_eq!(report.scores.recall, 1.0);
        assert_eq!(report.scores.fmeasure, 1.0);
    }

    #[test]
    fn test_no_shared_words_scores_zero() {
        let gold = parse_analyses("cat\tc a t\n").unwrap();
        let pred = parse_analyses("dog\td o g\n").unwrap();
        let report = evaluation_report(&gold, &pred, &EvalConfig::default()).unwrap();
        assert_eq!(report.scores.precision, 0.0);
        assert_eq!(report.scores.recall, 0.0);
        assert_eq!(report.scores.fmeasure, 0.0);
        assert_eq!(report.scores.word_count, 1);
    }

    #[test]
    fn test_alternatives_worked_example() {
        // Two gold alternatives against one prediction: recall contributions are pre-scaled
        // by 1/2, precision by 1/1, and the per-word matcher must pair "a b" with "a b".
        let gold = parse_analyses("w\ta b, a c\n").unwrap();
        let pred = parse_analyses("w\ta b\n").unwrap();
        let report = evaluation_report(&gold, &pred, &EvalConfig::default()).unwrap();
        assert!(close_enough(report.scores.precision, 1.0));
        assert!(close_enough(report.scores.recall, 0.5));
        assert!(close_enough(report.scores.fmeasure, 2.0 / 3.0));
    }

    #[test]
    fn test_missing_gold_word_still_counts() {
        let gold = parse_analyses("cat\tc a t\ndogs\td o g s\n").unwrap();
        let pred = parse_analyses("cat\tc a t\n").unwrap();
        let report = evaluation_report(&gold, &pred, &EvalConfig::default()).unwrap();
        assert!(close_enough(report.scores.precision, 0.5));
        assert!(close_enough(report.scores.recall, 0.5));
        assert_eq!(report.scores.word_count, 2);
    }

    #[test]
    fn test_extra_predicted_word_is_ignored() {
        let gold = parse_analyses("cat\tc a t\n").unwrap();
        let pred = parse_analyses("cat\tc a t\nextra\te x\n").unwrap();
        let report = evaluation_report(&gold, &pred, &EvalConfig::default()).unwrap();
        assert_eq!(report.scores.precision, 1.0);
        assert_eq!(report.scores.recall, 1.0);
        assert_eq!(report.scores.word_count, 1);
    }

    #[test]
    fn test_word_without_analyses_is_an_error() {
        let mut gold = Analyses::new();
        gold.insert(String::from("cat"), vec![]);
        let pred = parse_analyses("cat\tc a t\n").unwrap();
        let actual = evaluation_report(&gold, &pred, &EvalConfig::default());
        assert!(matches!(
            actual,
            Err(ComputationError::MissingAnalyses(word)) if word == "cat"
        ));
    }

    #[test]
    fn test_overlap_ratio_counts_multiset_occurrences() {
        let reference = Segmentation::from(vec!["a", "b", "a"]);
        let candidate = Segmentation::from(vec!["a", "a", "c"]);
        // Two `a` occurrences of the candidate are consumed, `c` is not.
        let actual = overlap_ratio(&reference, &candidate, "w").unwrap();
        assert!(close_enough(actual, 2.0 / 3.0));
    }

    #[test]
    fn test_overlap_ratio_is_order_invariant() {
        let word = "w";
        let orderings = [
            (vec!["a", "b", "a"], vec!["b", "a", "a"]),
            (vec!["a", "a", "b"], vec!["a", "b", "a"]),
            (vec!["b", "a", "a"], vec!["a", "a", "b"]),
        ];
        let reference = Segmentation::from(vec!["a", "b", "a"]);
        let candidate = Segmentation::from(vec!["b", "a", "a"]);
        let expected = overlap_ratio(&reference, &candidate, word).unwrap();
        for (shuffled_ref, shuffled_cand) in orderings {
            let actual = overlap_ratio(
                &Segmentation::from(shuffled_ref),
                &Segmentation::from(shuffled_cand),
                word,
            )
            .unwrap();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_overlap_ratio_is_asymmetric() {
        let longer = Segmentation::from(vec!["a", "b", "c", "d"]);
        let shorter = Segmentation::from(vec!["a", "b"]);
        let against_shorter = overlap_ratio(&longer, &shorter, "w").unwrap();
        let against_longer = overlap_ratio(&shorter, &longer, "w").unwrap();
        assert!(close_enough(against_shorter, 1.0));
        assert!(close_enough(against_longer, 0.5));
    }

    #[test]
    fn test_overlap_ratio_empty_candidate_is_an_error() {
        let reference = Segmentation::from(vec!["a"]);
        let candidate = Segmentation::default();
        let actual = overlap_ratio(&reference, &candidate, "cat");
        assert!(matches!(
            actual,
            Err(ComputationError::EmptySegmentation(word)) if word == "cat"
        ));
    }

    #[test]
    fn test_substitute_labels_passthrough() {
        let mut assignment = BTreeMap::new();
        assignment.insert(String::from("x"), String::from("a"));
        let segmentation = Segmentation::from(vec!["x", "y"]);
        let actual = substitute_labels(&segmentation, &assignment);
        assert_eq!(actual, Segmentation::from(vec!["a", "y"]));
    }

    #[test]
    fn test_cooccurrence_matrix_worked_example() {
        let gold = parse_analyses("w\ta b, a c\n").unwrap();
        let pred = parse_analyses("w\ta b\n").unwrap();
        let gold_vocab = Vocabulary::from_analyses(&gold);
        let pred_vocab = Vocabulary::from_analyses(&pred);
        let matrix = cooccurrence_matrix(&gold, &pred, &gold_vocab, &pred_vocab).unwrap();
        // Gold vocabulary rows a, b, c against predicted columns a, b; each of the two
        // gold alternatives contributes with ratio 1/2.
        assert_eq!(matrix.dim(), (3, 2));
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[0, 1]], 1.0);
        assert_eq!(matrix[[1, 0]], 0.5);
        assert_eq!(matrix[[1, 1]], 0.5);
        assert_eq!(matrix[[2, 0]], 0.5);
        assert_eq!(matrix[[2, 1]], 0.5);
    }

    #[test]
    fn test_cooccurrence_skips_words_missing_from_predictions() {
        let gold = parse_analyses("cat\tc a\nmissing\tm i\n").unwrap();
        let pred_full = parse_analyses("cat\tc a\n").unwrap();
        let gold_vocab = Vocabulary::from_analyses(&gold);
        let pred_vocab = Vocabulary::from_analyses(&pred_full);
        let matrix =
            cooccurrence_matrix(&gold, &pred_full, &gold_vocab, &pred_vocab).unwrap();
        // Rows for m and i stay zero.
        let row_i = gold_vocab.index_of("i").unwrap();
        let row_m = gold_vocab.index_of("m").unwrap();
        for col in 0..pred_vocab.len() {
            assert_eq!(matrix[[row_i, col]], 0.0);
            assert_eq!(matrix[[row_m, col]], 0.0);
        }
    }

    #[test]
    fn test_assignment_listing_of_renamed_labels() {
        // Prediction uses renamed labels with the exact same structure; the global matching
        // must recover the renaming.
        let gold = parse_analyses("cat\tc a t\ncart\tc a r t\n").unwrap();
        let pred = parse_analyses("cat\tC A T\ncart\tC A R T\n").unwrap();
        let config = EvalConfig {
            save_assignment: true,
            ..EvalConfig::default()
        };
        let report = evaluation_report(&gold, &pred, &config).unwrap();
        assert_eq!(report.scores.precision, 1.0);
        assert_eq!(report.scores.recall, 1.0);
        let listing = report.assignment.unwrap();
        let pairs: Vec<(String, String)> = listing
            .pairs()
            .iter()
            .map(|p| (p.gold.clone(), p.pred.clone()))
            .collect();
        let expected = vec![
            (String::from("a"), String::from("A")),
            (String::from("c"), String::from("C")),
            (String::from("r"), String::from("R")),
            (String::from("t"), String::from("T")),
        ];
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_substituted_listing_contains_rewritten_predictions() {
        let gold = parse_analyses("cat\tc a t\ncart\tc a r t\n").unwrap();
        let pred = parse_analyses("cat\tC A T\ncart\tC A R T\n").unwrap();
        let config = EvalConfig {
            save_result: true,
            ..EvalConfig::default()
        };
        let report = evaluation_report(&gold, &pred, &config).unwrap();
        let listing = report.substituted.unwrap();
        let expected = "cart\tc a r t\ncat\tc a t\n";
        assert_eq!(listing.to_string(), expected);
    }

    #[test]
    fn test_listings_absent_without_flags() {
        let gold = parse_analyses("cat\tc a t\n").unwrap();
        let report = evaluation_report(&gold, &gold, &EvalConfig::default()).unwrap();
        assert!(report.assignment.is_none());
        assert!(report.substituted.is_none());
    }
}
