use thiserror::Error;

/// Errors raised by the DF and scoring engines.
#[derive(Debug, Error)]
pub enum CiderError {
    /// DF computation was given a corpus with no documents.
    #[error("invalid corpus '{corpus}': no documents to count")]
    InvalidCorpus { corpus: String },

    /// Unknown IDF mode string.
    #[error("invalid IDF mode '{0}' (expected 'corpus' or 'precomputed')")]
    InvalidMode(String),

    /// A DF table line that does not parse into tokens plus one value.
    #[error("malformed DF record at line {line}: {reason}: {text:?}")]
    MalformedDfRecord {
        line: usize,
        text: String,
        reason: String,
    },

    /// Scoring needs at least one reference.
    #[error("no references supplied for candidate {candidate:?}")]
    EmptyReferences { candidate: String },

    /// Precomputed IDF mode was selected without a DF table.
    #[error("IDF mode 'precomputed' requires a DF table")]
    MissingDfTable,

    /// A raw-count DF table cannot be turned into IDF values without |Corpus|.
    #[error("DF table holds raw counts but the corpus size is unknown")]
    MissingCorpusSize,

    /// A token that the flat table format cannot hold.
    #[error("token {0:?} cannot be written to a DF table (empty or contains whitespace)")]
    UnrepresentableToken(String),

    /// N-gram order outside `1..=MAX_ORDER`.
    #[error("n-gram order {order} out of range 1..={max}")]
    InvalidOrder { order: usize, max: usize },
}

impl CiderError {
    pub fn invalid_corpus(corpus: impl Into<String>) -> Self {
        Self::InvalidCorpus {
            corpus: corpus.into(),
        }
    }

    pub fn malformed(line: usize, text: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDfRecord {
            line,
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CiderError>;
