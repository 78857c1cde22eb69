/*!
Rumma is a fast implementation of EMMA (Evaluation Metric for Morpheme Analysis). It scores
a predicted morpheme analysis of a word list against a gold standard analysis and reports
precision, recall and f-measure.

The predicted morpheme labels do not have to spell the gold standard labels: a corpus-wide
maximum-weight matching first assigns every predicted label to at most one gold standard
label, the predictions are rewritten under that assignment and only then compared. Words may
carry several alternative analyses on either side; the alternatives are paired up by a second
matching per word, and supplying too few or too many alternatives lowers the scores.

The input follows the Morpho Challenge result format, one word per line:

```text
word<TAB>analysis 1[morpheme space]*, ..., analysis n
```

# Example

```rust
use rumma::evaluate;

let gold = "cat\tc a t\n".parse().unwrap();
let pred = "cat\tc a t\n".parse().unwrap();
let scores = evaluate(&gold, &pred).unwrap();
assert_eq!(scores.precision, 1.0);
assert_eq!(scores.recall, 1.0);
assert_eq!(scores.fmeasure, 1.0);
```

For the listings (the label assignment and the substituted predictions) and the diagnostic
logging, build an [`EvalConfig`] and call [`evaluation_report`] or, for corpus files,
[`evaluation_report_files`].
*/
mod config;
mod matching;
mod metrics;
mod reporter;
mod vocab;

pub use config::{EvalConfig, EvalConfigBuilder};
pub use matching::{maximum_weight_matching, FloatExt, Matching};
pub use metrics::{
    evaluation_report, evaluation_report_files, substitute_labels, ComputationError,
};
pub use morpheme_parsing::{parse_analyses, Analyses, ParsingError, Segmentation};
pub use reporter::{
    AssignmentListing, AssignmentPair, EvalReport, Scores, SubstitutedListing, SubstitutedWord,
};
pub use vocab::Vocabulary;

/// Evaluates a predicted analysis set against a gold standard analysis set with the default
/// configuration and returns only the scores.
pub fn evaluate(gold: &Analyses, pred: &Analyses) -> Result<Scores, ComputationError> {
    Ok(evaluation_report(gold, pred, &EvalConfig::default())?.scores)
}
