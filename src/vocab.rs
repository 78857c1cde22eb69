/*
 * The vocabulary assigns a stable index to every morpheme label of an analysis set. The
 * co-occurrence matrix and the matching are expressed in these indices, so the order must be
 * total and identical across runs: labels are sorted lexicographically (byte-wise `Ord` on
 * `str`) and deduplicated.
*/
use ahash::AHashMap;
use morpheme_parsing::{Analyses, Segmentation};
use std::collections::BTreeSet;

/// Sorted, deduplicated index over every morpheme label occurring in an analysis set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vocabulary {
    labels: Vec<String>,
    indices: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Builds the vocabulary of a whole analysis set.
    pub fn from_analyses(analyses: &Analyses) -> Self {
        Self::from_segmentations(analyses.segmentations())
    }

    /// Builds a vocabulary from any collection of segmentations.
    pub fn from_segmentations<'a, I>(segmentations: I) -> Self
    where
        I: IntoIterator<Item = &'a Segmentation>,
    {
        let mut sorted: BTreeSet<&str> = BTreeSet::new();
        for segmentation in segmentations {
            for label in segmentation.iter() {
                sorted.insert(label.as_str());
            }
        }
        let labels: Vec<String> = sorted.into_iter().map(String::from).collect();
        let indices = labels
            .iter()
            .enumerate()
            .map(|(index, label)| (label.clone(), index))
            .collect();
        Vocabulary { labels, indices }
    }

    /// The index of a label, if the label belongs to the vocabulary.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.indices.get(label).copied()
    }

    /// The label at a given index. Panics if the index is out of bounds.
    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over the labels in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.as_str())
    }
}
