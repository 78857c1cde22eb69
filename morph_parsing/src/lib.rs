/*!
This crate parses morpheme-analysis word lists into the datastructures used by the Rumma
evaluation library. The input follows the Morpho Challenge result format: one word per line,
the word and its analyses separated by a single tab, alternative analyses separated by commas
and the morpheme labels of an analysis separated by whitespace.

```text
word<TAB>analysis 1[morpheme space]*, ..., analysis n
```

# Terminology
* A morpheme label is an atomic segment or tag token inside an analysis, such as `un`, `do`
    or `PAST`.
* A segmentation (or analysis) is an ordered sequence of morpheme labels representing one way
    of analyzing a word.
* An alternative is one of possibly several accepted segmentations of the same word.
* An analysis set maps every word of a corpus to its non-empty list of alternatives.

Parsing is strict: a line without a tab, a line with an empty word or an analysis without a
single morpheme label abort the parse with a `ParsingError`. Recovering from such lines by
skipping them would silently change the word count the evaluation normalizes with.
*/
use ahash::AHashSet;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;

/// One analysis of a word: an ordered sequence of morpheme labels. The evaluation compares
/// segmentations as multisets, the order is only kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Segmentation {
    labels: Vec<String>,
}

impl Segmentation {
    pub fn new(labels: Vec<String>) -> Self {
        Segmentation { labels }
    }
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Deref for Segmentation {
    type Target = [String];
    fn deref(&self) -> &Self::Target {
        &self.labels
    }
}

/// A segmentation displays as its labels joined by single spaces, i.e. the same shape it was
/// parsed from.
impl Display for Segmentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.labels.join(" "))
    }
}

impl From<Vec<String>> for Segmentation {
    fn from(value: Vec<String>) -> Self {
        Segmentation { labels: value }
    }
}

impl From<Vec<&str>> for Segmentation {
    fn from(value: Vec<&str>) -> Self {
        Segmentation {
            labels: value.into_iter().map(String::from).collect(),
        }
    }
}

impl FromIterator<String> for Segmentation {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Segmentation {
            labels: iter.into_iter().collect(),
        }
    }
}

/// An analysis set: every word of a corpus mapped to its ordered list of alternative
/// segmentations. Words are kept in a `BTreeMap` so that every traversal of the corpus is
/// deterministic, which downstream fixes the vocabulary indices and hence the matching.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Analyses {
    words: BTreeMap<String, Vec<Segmentation>>,
}

impl Analyses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a word with its alternatives. A word already present is replaced and its
    /// previous alternatives returned, mirroring how repeated corpus lines overwrite earlier
    /// ones.
    pub fn insert(
        &mut self,
        word: String,
        alternatives: Vec<Segmentation>,
    ) -> Option<Vec<Segmentation>> {
        self.words.insert(word, alternatives)
    }

    pub fn get(&self, word: &str) -> Option<&[Segmentation]> {
        self.words.get(word).map(|v| v.as_slice())
    }

    /// Number of words in the analysis set.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterates over the words and their alternatives in lexicographic word order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Segmentation])> {
        self.words.iter().map(|(w, a)| (w.as_str(), a.as_slice()))
    }

    /// Every segmentation of every word, in lexicographic word order.
    pub fn segmentations(&self) -> impl Iterator<Item = &Segmentation> {
        self.words.values().flatten()
    }

    /// The set of words of this analysis set.
    pub fn word_set(&self) -> AHashSet<&str> {
        self.words.keys().map(|w| w.as_str()).collect()
    }

    /// Returns a copy of this analysis set restricted to the given words. The evaluation uses
    /// this to drop predicted words absent from the gold standard before any vocabulary is
    /// built.
    pub fn restrict_to(&self, words: &AHashSet<&str>) -> Analyses {
        let kept = self
            .words
            .iter()
            .filter(|(w, _)| words.contains(w.as_str()))
            .map(|(w, a)| (w.clone(), a.clone()))
            .collect();
        Analyses { words: kept }
    }
}

/// An analysis set displays in the corpus format it was parsed from, one `word<TAB>analyses`
/// line per word in lexicographic word order.
impl Display for Analyses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (word, alternatives) in self.words.iter() {
            let joined: Vec<String> = alternatives.iter().map(|s| s.to_string()).collect();
            writeln!(f, "{}\t{}", word, joined.join(", "))?;
        }
        Ok(())
    }
}

impl FromStr for Analyses {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_analyses(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ways a corpus file can be malformed. Line numbers are 1-based.
pub enum ParsingError {
    /// The line has no tab separating the word from its analyses.
    MissingTab { line: usize },
    /// The part before the tab contains no word.
    EmptyWord { line: usize },
    /// One of the comma-separated analyses of this word contains no morpheme label.
    EmptyAnalysis { word: String, line: usize },
}

impl Display for ParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTab { line } => {
                write!(f, "Line {} has no tab between the word and its analyses", line)
            }
            Self::EmptyWord { line } => write!(f, "Line {} has an empty word", line),
            Self::EmptyAnalysis { word, line } => write!(
                f,
                "Word {} on line {} has an analysis without any morpheme label",
                word, line
            ),
        }
    }
}

impl Error for ParsingError {}

/// Parses a whole corpus into an `Analyses`. Each line must be of the form
/// `word<TAB>alt1, alt2, ..., altN` where every `alt` is a whitespace-separated sequence of
/// morpheme labels. A word appearing on several lines keeps the alternatives of the last
/// line. Any malformed line aborts the parse.
pub fn parse_analyses(input: &str) -> Result<Analyses, ParsingError> {
    let mut analyses = Analyses::new();
    for (index, raw_line) in input.lines().enumerate() {
        let line = index + 1;
        let content = raw_line.trim_end_matches('\r');
        let (word, rest) = content
            .split_once('\t')
            .ok_or(ParsingError::MissingTab { line })?;
        if word.is_empty() {
            return Err(ParsingError::EmptyWord { line });
        }
        let mut alternatives = Vec::new();
        for alternative in rest.split(',') {
            let segmentation: Segmentation = alternative
                .split_whitespace()
                .map(String::from)
                .collect();
            if segmentation.is_empty() {
                return Err(ParsingError::EmptyAnalysis {
                    word: String::from(word),
                    line,
                });
            }
            alternatives.push(segmentation);
        }
        analyses.insert(String::from(word), alternatives);
    }
    Ok(analyses)
}
