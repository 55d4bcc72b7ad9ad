use crate::error::CiderError;
use crate::ngram::NGram;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// What the values of a [`DfTable`] mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DfKind {
    /// Number of documents containing the n-gram.
    Count,
    /// `ln(|Corpus| / DF)`, already transformed.
    LogIdf,
}

impl FromStr for DfKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "count" | "raw" => Ok(DfKind::Count),
            "log-idf" | "idf" => Ok(DfKind::LogIdf),
            other => anyhow::bail!(
                "unknown DF table format '{}' (expected 'count' or 'log-idf')",
                other
            ),
        }
    }
}

impl fmt::Display for DfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DfKind::Count => write!(f, "count"),
            DfKind::LogIdf => write!(f, "log-idf"),
        }
    }
}

/// What to do with a table line that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    /// Fail the whole load.
    #[default]
    Abort,
    /// Log the line and leave it out.
    Skip,
}

impl FromStr for MalformedPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "abort" => Ok(MalformedPolicy::Abort),
            "skip" => Ok(MalformedPolicy::Skip),
            other => anyhow::bail!("unknown malformed-record policy '{}'", other),
        }
    }
}

/// N-gram → document frequency (or its log-IDF). Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DfTable {
    kind: DfKind,
    corpus_size: Option<usize>,
    entries: BTreeMap<NGram, f64>,
}

impl DfTable {
    pub fn from_counts(counts: BTreeMap<NGram, usize>, corpus_size: Option<usize>) -> Self {
        Self {
            kind: DfKind::Count,
            corpus_size,
            entries: counts.into_iter().map(|(k, v)| (k, v as f64)).collect(),
        }
    }

    pub fn from_idf(idf: BTreeMap<NGram, f64>) -> Self {
        Self {
            kind: DfKind::LogIdf,
            corpus_size: None,
            entries: idf,
        }
    }

    pub fn kind(&self) -> DfKind {
        self.kind
    }

    /// |Corpus| the counts were taken over, when known.
    pub fn corpus_size(&self) -> Option<usize> {
        self.corpus_size
    }

    /// Record |Corpus| for a count table loaded from disk.
    pub fn with_corpus_size(mut self, corpus_size: usize) -> Self {
        self.corpus_size = Some(corpus_size);
        self
    }

    pub fn get(&self, ngram: &NGram) -> Option<f64> {
        self.entries.get(ngram).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in n-gram order.
    pub fn iter(&self) -> impl Iterator<Item = (&NGram, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    /// A log-IDF copy of this table. Count tables need a corpus size, either
    /// recorded in the table or passed here (the argument wins).
    pub fn to_log_idf(&self, corpus_size: Option<usize>) -> crate::error::Result<DfTable> {
        if self.kind == DfKind::LogIdf {
            return Ok(self.clone());
        }
        let n = corpus_size
            .or(self.corpus_size)
            .ok_or(CiderError::MissingCorpusSize)?;
        if n == 0 {
            return Err(CiderError::invalid_corpus(format!("corpus of size {}", n)));
        }

        let mut idf = BTreeMap::new();
        for (ngram, df) in &self.entries {
            if *df > n as f64 {
                return Err(CiderError::invalid_corpus(format!(
                    "corpus of size {} (n-gram '{}' has DF {})",
                    n, ngram, df
                )));
            }
            idf.insert(ngram.clone(), log_idf(n, *df));
        }
        Ok(DfTable {
            kind: DfKind::LogIdf,
            corpus_size: Some(n),
            entries: idf,
        })
    }

    /// Write one `tokens... value` line per entry.
    ///
    /// Every token is checked before the first byte is written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for ngram in self.entries.keys() {
            if let Some(bad) = ngram
                .tokens()
                .iter()
                .find(|t| t.is_empty() || t.chars().any(char::is_whitespace))
            {
                return Err(CiderError::UnrepresentableToken(bad.clone()).into());
            }
        }

        for (ngram, value) in &self.entries {
            match self.kind {
                DfKind::Count => writeln!(writer, "{} {}", ngram, *value as u64)?,
                DfKind::LogIdf => writeln!(writer, "{} {}", ngram, value)?,
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Parse a table whose values are of `kind`.
    pub fn read_from<R: BufRead>(
        reader: R,
        kind: DfKind,
        policy: MalformedPolicy,
    ) -> Result<DfTable> {
        let mut entries = BTreeMap::new();
        let mut skipped = 0usize;

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.with_context(|| format!("Failed to read DF table line {}", line_no))?;
            if line.trim().is_empty() {
                continue;
            }

            let parsed = parse_record(&line, line_no, kind).and_then(|(ngram, value)| {
                if entries.contains_key(&ngram) {
                    Err(CiderError::malformed(line_no, &line, "duplicate n-gram"))
                } else {
                    Ok((ngram, value))
                }
            });

            match parsed {
                Ok((ngram, value)) => {
                    entries.insert(ngram, value);
                }
                Err(e) => match policy {
                    MalformedPolicy::Abort => return Err(e.into()),
                    MalformedPolicy::Skip => {
                        warn!(error = %e, "Skipping DF record");
                        skipped += 1;
                    }
                },
            }
        }

        if skipped > 0 {
            warn!(skipped, kept = entries.len(), "DF table loaded with skipped records");
        }

        Ok(DfTable {
            kind,
            corpus_size: None,
            entries,
        })
    }

    /// Write the table to `path`. The file only appears once fully written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = Path::new(&tmp_name);

        let written = File::create(tmp)
            .with_context(|| format!("Failed to create {}", tmp.display()))
            .and_then(|file| self.write_to(BufWriter::new(file)));
        if let Err(e) = written {
            let _ = fs::remove_file(tmp);
            return Err(e);
        }

        fs::rename(tmp, path)
            .with_context(|| format!("Failed to move DF table into {}", path.display()))?;
        info!(path = %path.display(), entries = self.len(), kind = %self.kind, "Saved DF table");
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P, kind: DfKind, policy: MalformedPolicy) -> Result<DfTable> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open DF table {}", path.display()))?;
        let table = Self::read_from(std::io::BufReader::new(file), kind, policy)
            .with_context(|| format!("Failed to load DF table {}", path.display()))?;
        info!(path = %path.display(), entries = table.len(), kind = %kind, "Loaded DF table");
        Ok(table)
    }
}

/// `ln(|Corpus| / DF)`.
pub fn log_idf(corpus_size: usize, df: f64) -> f64 {
    (corpus_size as f64 / df).ln()
}

fn parse_record(line: &str, line_no: usize, kind: DfKind) -> crate::error::Result<(NGram, f64)> {
    let mut fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(CiderError::malformed(line_no, line, "expected tokens followed by a value"));
    }
    let raw = fields.pop().unwrap_or_default();

    let value = match kind {
        DfKind::Count => {
            let count: u64 = raw.parse().map_err(|_| {
                CiderError::malformed(line_no, line, "value is not a non-negative integer")
            })?;
            if count == 0 {
                return Err(CiderError::malformed(
                    line_no,
                    line,
                    "document frequency must be at least 1",
                ));
            }
            count as f64
        }
        DfKind::LogIdf => {
            let idf: f64 = raw
                .parse()
                .map_err(|_| CiderError::malformed(line_no, line, "value is not a number"))?;
            if !idf.is_finite() || idf < 0.0 {
                return Err(CiderError::malformed(
                    line_no,
                    line,
                    "IDF must be finite and non-negative",
                ));
            }
            idf
        }
    };

    Ok((NGram::from_slice(&fields), value))
}
