//! Corpus n-gram document frequencies and a CIDEr-D-style consensus score.
//!
//! Two engines share the n-gram extractor: [`DfCounter`] builds a [`DfTable`]
//! from a [`Corpus`], and [`CiderScorer`] rates a candidate text against its
//! references with TF-IDF weighted n-gram cosine similarity.

pub mod batch;
pub mod config;
pub mod corpus;
pub mod cosine;
pub mod df;
pub mod document;
pub mod engine;
pub mod error;
pub mod ngram;
pub mod report;
pub mod table;
pub mod tfidf;
pub mod tokenizer;

// Re-export commonly used types
pub use batch::{BatchItem, BatchOutcome};
pub use config::Settings;
pub use corpus::CorpusLoader;
pub use cosine::{CiderScore, OrderScore};
pub use df::{ContainmentKind, DfCounter, SubstringContainment, TokenSequenceContainment};
pub use document::{Corpus, Document};
pub use engine::{consensus_score, score, CiderScorer};
pub use error::CiderError;
pub use ngram::{NGram, MAX_ORDER};
pub use report::ScoreReport;
pub use table::{DfKind, DfTable, MalformedPolicy};
pub use tfidf::{IdfMode, IdfSource};
pub use tokenizer::{Pipeline, Tokenizer, UnicodeTokenizer, WhitespaceTokenizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
