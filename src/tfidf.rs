use crate::error::{CiderError, Result};
use crate::ngram::{self, NGram};
use crate::table::{DfKind, DfTable};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// N-gram → weight for one text at one order. Zero entries may be present.
pub type SparseVector = HashMap<NGram, f64>;

/// Where IDF weights come from, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdfMode {
    /// Weight derived from the size of the candidate's own reference set.
    #[default]
    Corpus,
    /// Lookup in a DF table built offline.
    #[serde(alias = "coco-val-df")]
    Precomputed,
}

impl FromStr for IdfMode {
    type Err = CiderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "corpus" => Ok(IdfMode::Corpus),
            "precomputed" | "coco-val-df" => Ok(IdfMode::Precomputed),
            other => Err(CiderError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for IdfMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdfMode::Corpus => write!(f, "corpus"),
            IdfMode::Precomputed => write!(f, "precomputed"),
        }
    }
}

/// A resolved IDF source, fixed for one scoring call.
#[derive(Debug, Clone)]
pub enum IdfSource<'a> {
    /// `ln(|R| + 1)` for every n-gram: the reference set alone never
    /// lowers an n-gram's weight.
    CorpusRelative,
    /// Log-IDF table; n-grams not in the table weigh 0.
    Precomputed(Cow<'a, DfTable>),
}

impl<'a> IdfSource<'a> {
    /// Use `table` for lookups. Count tables are converted using their
    /// recorded corpus size.
    pub fn precomputed(table: &'a DfTable) -> Result<Self> {
        match table.kind() {
            DfKind::LogIdf => Ok(IdfSource::Precomputed(Cow::Borrowed(table))),
            DfKind::Count => Ok(IdfSource::Precomputed(Cow::Owned(table.to_log_idf(None)?))),
        }
    }

    /// Resolve a mode into a source.
    pub fn resolve(mode: IdfMode, table: Option<&'a DfTable>) -> Result<Self> {
        match mode {
            IdfMode::Corpus => Ok(IdfSource::CorpusRelative),
            IdfMode::Precomputed => Self::precomputed(table.ok_or(CiderError::MissingDfTable)?),
        }
    }
}

/// Term frequencies: count / number of n-grams of that order in the text.
pub fn tf_vector<S: AsRef<str>>(tokens: &[S], order: usize) -> SparseVector {
    tf_from_counts(ngram::count(tokens, order))
}

fn tf_from_counts(counts: HashMap<NGram, usize>) -> SparseVector {
    let total: usize = counts.values().sum();
    counts
        .into_iter()
        .map(|(gram, c)| (gram, c as f64 / total as f64))
        .collect()
}

/// TF-IDF vectors of a candidate and its references at one order.
///
/// Every reference vector is keyed by the candidate's n-grams only, so all
/// vectors share one index.
#[derive(Debug, Clone)]
pub struct OrderVectors {
    pub candidate: SparseVector,
    pub references: Vec<SparseVector>,
}

/// Build the order-`order` TF-IDF vectors.
pub fn vectorize<S: AsRef<str>, R: AsRef<[S]>>(
    candidate: &[S],
    references: &[R],
    order: usize,
    idf: &IdfSource<'_>,
) -> OrderVectors {
    let candidate_tf = tf_vector(candidate, order);
    let reference_counts: Vec<HashMap<NGram, usize>> = references
        .iter()
        .map(|r| ngram::count(r.as_ref(), order))
        .collect();
    let reference_tf: Vec<SparseVector> =
        reference_counts.into_iter().map(tf_from_counts).collect();

    let mut weighted_candidate = SparseVector::with_capacity(candidate_tf.len());
    let mut weighted_references =
        vec![SparseVector::with_capacity(candidate_tf.len()); references.len()];

    // Corpus-relative weighting treats no reference as containing the
    // n-gram, so every candidate n-gram weighs ln(|R| + 1).
    let corpus_weight = (references.len() as f64 + 1.0).ln();

    for (gram, tf) in &candidate_tf {
        let weight = match idf {
            IdfSource::CorpusRelative => corpus_weight,
            IdfSource::Precomputed(table) => table.get(gram).unwrap_or(0.0),
        };

        weighted_candidate.insert(gram.clone(), tf * weight);
        for (out, tf_ref) in weighted_references.iter_mut().zip(&reference_tf) {
            out.insert(gram.clone(), tf_ref.get(gram).copied().unwrap_or(0.0) * weight);
        }
    }

    OrderVectors {
        candidate: weighted_candidate,
        references: weighted_references,
    }
}
