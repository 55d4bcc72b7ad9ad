//! Document-frequency counting over a corpus snapshot.
//!
//! Every distinct n-gram of order `1..=MAX_ORDER` is collected first, then
//! each one is tested against every document with a [`Containment`]
//! predicate. The default predicate is surface substring matching on the
//! token-concatenated strings, which can match across token boundaries.

use crate::document::{Corpus, Document};
use crate::error::{CiderError, Result};
use crate::ngram::{self, NGram, MAX_ORDER};
use crate::table::{DfKind, DfTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use tracing::{debug, info};

/// Decides whether a document contains an n-gram.
pub trait Containment {
    /// Per-document form, built once per DF run.
    type Prepared;
    /// Per-n-gram form, built once per n-gram.
    type Needle;

    fn prepare(&self, document: &Document) -> Self::Prepared;
    fn needle(&self, ngram: &NGram) -> Self::Needle;
    fn contains(&self, haystack: &Self::Prepared, needle: &Self::Needle) -> bool;
}

/// `"".join(ngram)` is a substring of `"".join(document)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringContainment;

impl Containment for SubstringContainment {
    type Prepared = String;
    type Needle = String;

    fn prepare(&self, document: &Document) -> String {
        document.concatenated()
    }

    fn needle(&self, ngram: &NGram) -> String {
        ngram.concatenated()
    }

    fn contains(&self, haystack: &String, needle: &String) -> bool {
        haystack.contains(needle.as_str())
    }
}

/// The n-gram occurs as an exact window of the document's tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSequenceContainment;

impl Containment for TokenSequenceContainment {
    type Prepared = Vec<String>;
    type Needle = NGram;

    fn prepare(&self, document: &Document) -> Vec<String> {
        document.tokens().to_vec()
    }

    fn needle(&self, ngram: &NGram) -> NGram {
        ngram.clone()
    }

    fn contains(&self, haystack: &Vec<String>, needle: &NGram) -> bool {
        let n = needle.order();
        n > 0 && haystack.windows(n).any(|w| w == needle.tokens())
    }
}

/// Runtime choice of containment predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainmentKind {
    #[default]
    Substring,
    Token,
}

impl FromStr for ContainmentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "substring" => Ok(ContainmentKind::Substring),
            "token" => Ok(ContainmentKind::Token),
            other => anyhow::bail!(
                "unknown containment '{}' (expected 'substring' or 'token')",
                other
            ),
        }
    }
}

/// Builds a [`DfTable`] from a corpus.
#[derive(Debug, Clone)]
pub struct DfCounter<C: Containment = SubstringContainment> {
    containment: C,
    output: DfKind,
}

impl DfCounter<SubstringContainment> {
    pub fn new() -> Self {
        Self::with_containment(SubstringContainment)
    }
}

impl Default for DfCounter<SubstringContainment> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Containment> DfCounter<C> {
    pub fn with_containment(containment: C) -> Self {
        Self {
            containment,
            output: DfKind::Count,
        }
    }

    /// Record `ln(|Corpus| / DF)` instead of raw counts.
    pub fn output(mut self, output: DfKind) -> Self {
        self.output = output;
        self
    }

    pub fn count(&self, corpus: &Corpus) -> Result<DfTable> {
        self.count_with_progress(corpus, |_, _| {})
    }

    /// Count document frequencies, calling `progress(done, total)` after each
    /// distinct n-gram is scanned.
    pub fn count_with_progress<P>(&self, corpus: &Corpus, mut progress: P) -> Result<DfTable>
    where
        P: FnMut(usize, usize),
    {
        if corpus.is_empty() {
            return Err(CiderError::invalid_corpus(corpus.name()));
        }

        let distinct = distinct_ngrams(corpus);
        let total = distinct.len();
        info!(
            corpus = corpus.name(),
            documents = corpus.len(),
            ngrams = total,
            "Counting document frequencies"
        );

        let prepared: Vec<C::Prepared> = corpus
            .documents()
            .iter()
            .map(|d| self.containment.prepare(d))
            .collect();

        let mut counts = BTreeMap::new();
        for (i, gram) in distinct.into_iter().enumerate() {
            let needle = self.containment.needle(&gram);
            let df = prepared
                .iter()
                .filter(|doc| self.containment.contains(doc, &needle))
                .count();
            if df > 0 {
                counts.insert(gram, df);
            }
            progress(i + 1, total);
        }
        debug!(entries = counts.len(), "Document frequencies counted");

        let table = DfTable::from_counts(counts, Some(corpus.len()));
        match self.output {
            DfKind::Count => Ok(table),
            DfKind::LogIdf => table.to_log_idf(None),
        }
    }
}

/// Distinct n-grams of every order, in first-seen order (orders ascending).
pub fn distinct_ngrams(corpus: &Corpus) -> Vec<NGram> {
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();
    for order in 1..=MAX_ORDER {
        for doc in corpus.documents() {
            for gram in ngram::extract(doc.tokens(), order) {
                if !seen.contains(&gram) {
                    seen.insert(gram.clone());
                    distinct.push(gram);
                }
            }
        }
    }
    distinct
}
