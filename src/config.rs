use crate::corpus::{CorpusLoader, DEFAULT_FIELD};
use crate::df::ContainmentKind;
use crate::engine::CiderScorer;
use crate::table::{DfKind, DfTable, MalformedPolicy};
use crate::tfidf::IdfMode;
use crate::tokenizer::{
    Identity, Lowercase, Normalizer, Pipeline, Tokenizer, UnicodeTokenizer, WhitespaceTokenizer,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenizerKind {
    /// Text is already segmented with spaces.
    #[default]
    Whitespace,
    /// Unicode word boundaries.
    Unicode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerSettings {
    pub kind: TokenizerKind,
    pub lowercase: bool,
    /// Snowball stemmer language; only used by the unicode tokenizer.
    pub stem_language: Option<String>,
}

/// Settings file contents. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub idf_mode: IdfMode,
    pub df_table: Option<PathBuf>,
    pub df_format: DfKind,
    /// |Corpus| for raw-count tables read from disk.
    pub corpus_size: Option<usize>,
    pub on_malformed: MalformedPolicy,
    pub containment: ContainmentKind,
    pub tokenizer: TokenizerSettings,
    /// JSON pointer to the text field of each corpus record.
    pub corpus_field: String,
    /// Report column titles.
    pub titles: Vec<String>,
    /// Log DF progress every this many n-grams.
    pub progress_every: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            idf_mode: IdfMode::Corpus,
            df_table: None,
            df_format: DfKind::Count,
            corpus_size: None,
            on_malformed: MalformedPolicy::Abort,
            containment: ContainmentKind::Substring,
            tokenizer: TokenizerSettings::default(),
            corpus_field: DEFAULT_FIELD.to_string(),
            titles: Vec::new(),
            progress_every: 1000,
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open settings {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn pipeline(&self) -> Result<Pipeline> {
        let t = &self.tokenizer;
        let normalizer: Box<dyn Normalizer> = if t.lowercase {
            Box::new(Lowercase)
        } else {
            Box::new(Identity)
        };
        let tokenizer: Box<dyn Tokenizer> = match t.kind {
            TokenizerKind::Whitespace => Box::new(WhitespaceTokenizer::new()),
            TokenizerKind::Unicode => match &t.stem_language {
                Some(lang) => Box::new(UnicodeTokenizer::with_language(lang)?),
                None => Box::new(UnicodeTokenizer::new()),
            },
        };
        Ok(Pipeline::new(normalizer, tokenizer))
    }

    pub fn corpus_loader(&self) -> Result<CorpusLoader> {
        Ok(CorpusLoader::new(self.corpus_field.clone(), self.pipeline()?))
    }

    /// The configured DF table, with the corpus size applied to count tables.
    pub fn load_df_table(&self) -> Result<Option<DfTable>> {
        let Some(path) = &self.df_table else {
            return Ok(None);
        };
        let mut table = DfTable::load(path, self.df_format, self.on_malformed)?;
        if let Some(n) = self.corpus_size {
            table = table.with_corpus_size(n);
        }
        Ok(Some(table))
    }

    pub fn scorer(&self) -> Result<CiderScorer> {
        let pipeline = Box::new(self.pipeline()?);
        let mut scorer = match self.load_df_table()? {
            Some(table) => CiderScorer::with_table(pipeline, table)?,
            None => CiderScorer::new(pipeline),
        };
        scorer.set_mode(self.idf_mode);
        Ok(scorer)
    }
}
