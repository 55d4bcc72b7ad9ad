use crate::cosine::{best_match, CiderScore, DenseOrder, OrderScore};
use crate::error::CiderError;
use crate::ngram::MAX_ORDER;
use crate::table::DfTable;
use crate::tfidf::{vectorize, IdfMode, IdfSource};
use crate::tokenizer::{Pipeline, Tokenizer};
use anyhow::{Context, Result};
use tracing::debug;

/// Score already-tokenized texts.
///
/// Each order `1..=MAX_ORDER` contributes its best cosine similarity over the
/// references; the result is the plain mean of the four.
pub fn consensus_score<S, R>(
    candidate: &[S],
    references: &[R],
    idf: &IdfSource<'_>,
) -> crate::error::Result<CiderScore>
where
    S: AsRef<str>,
    R: AsRef<[S]>,
{
    if references.is_empty() {
        let text: Vec<&str> = candidate.iter().map(|t| t.as_ref()).collect();
        return Err(CiderError::EmptyReferences {
            candidate: text.join(" "),
        });
    }

    let per_order: [OrderScore; MAX_ORDER] = std::array::from_fn(|i| {
        let order = i + 1;
        let vectors = vectorize(candidate, references, order, idf);
        let dense = DenseOrder::from_sparse(&vectors);
        best_match(order, &dense.similarities())
    });
    Ok(CiderScore::from_orders(per_order))
}

/// Tokenizes texts and scores them against an IDF source.
pub struct CiderScorer {
    tokenizer: Box<dyn Tokenizer>,
    mode: IdfMode,
    table: Option<DfTable>,
}

impl CiderScorer {
    /// Corpus-relative scorer.
    pub fn new(tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            mode: IdfMode::Corpus,
            table: None,
        }
    }

    /// Scorer backed by a DF table. Count tables are converted to log-IDF
    /// here, so they must carry their corpus size.
    pub fn with_table(tokenizer: Box<dyn Tokenizer>, table: DfTable) -> crate::error::Result<Self> {
        let table = table.to_log_idf(None)?;
        Ok(Self {
            tokenizer,
            mode: IdfMode::Precomputed,
            table: Some(table),
        })
    }

    pub fn mode(&self) -> IdfMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: IdfMode) {
        self.mode = mode;
    }

    pub fn table(&self) -> Option<&DfTable> {
        self.table.as_ref()
    }

    /// Score with the scorer's own mode.
    pub fn score<T: AsRef<str>>(&self, candidate: &str, references: &[T]) -> Result<f64> {
        Ok(self.score_detailed(candidate, references)?.score)
    }

    pub fn score_detailed<T: AsRef<str>>(
        &self,
        candidate: &str,
        references: &[T],
    ) -> Result<CiderScore> {
        self.score_with_mode(candidate, references, self.mode)
    }

    /// Score with an explicit mode, overriding the scorer's default.
    pub fn score_with_mode<T: AsRef<str>>(
        &self,
        candidate: &str,
        references: &[T],
        mode: IdfMode,
    ) -> Result<CiderScore> {
        let idf = IdfSource::resolve(mode, self.table.as_ref())?;

        let candidate_tokens = self
            .tokenizer
            .tokenize(candidate)
            .with_context(|| format!("Failed to tokenize candidate {:?}", candidate))?;
        let reference_tokens = references
            .iter()
            .map(|r| {
                self.tokenizer
                    .tokenize(r.as_ref())
                    .with_context(|| format!("Failed to tokenize reference {:?}", r.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;

        let score = consensus_score(&candidate_tokens, &reference_tokens, &idf)?;
        debug!(candidate, mode = %mode, score = score.score, "Scored candidate");
        Ok(score)
    }
}

impl Default for CiderScorer {
    fn default() -> Self {
        Self::new(Box::new(Pipeline::default()))
    }
}

/// One-shot scoring with a mode given by name.
///
/// `idf_mode` is `"corpus"` or `"precomputed"`; anything else is
/// [`CiderError::InvalidMode`].
pub fn score<T: AsRef<str>>(
    candidate: &str,
    references: &[T],
    idf_mode: &str,
    df_table: Option<&DfTable>,
    tokenizer: &dyn Tokenizer,
) -> Result<f64> {
    let mode: IdfMode = idf_mode.parse()?;
    let idf = IdfSource::resolve(mode, df_table)?;

    let candidate_tokens = tokenizer.tokenize(candidate)?;
    let reference_tokens = references
        .iter()
        .map(|r| tokenizer.tokenize(r.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    Ok(consensus_score(&candidate_tokens, &reference_tokens, &idf)?.score)
}
