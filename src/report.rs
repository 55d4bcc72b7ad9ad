use crate::batch::BatchOutcome;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Scores of one item, in candidate order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: String,
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFailure {
    pub id: String,
    pub message: String,
}

/// Candidate id → per-candidate scores, ready to be written out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Column titles, e.g. the name of each captioning system.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<String>,
    pub rows: Vec<ReportRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ReportFailure>,
}

impl ScoreReport {
    pub fn new(titles: Vec<String>) -> Self {
        Self {
            titles,
            ..Default::default()
        }
    }

    pub fn from_outcomes(titles: Vec<String>, outcomes: Vec<BatchOutcome>) -> Self {
        let mut report = Self::new(titles);
        for outcome in outcomes {
            match outcome.result {
                Ok(scores) => report.rows.push(ReportRow {
                    id: outcome.id,
                    scores,
                }),
                Err(e) => report.failures.push(ReportFailure {
                    id: outcome.id,
                    message: format!("{:#}", e),
                }),
            }
        }
        report
    }

    pub fn get(&self, id: &str) -> Option<&[f64]> {
        self.rows.iter().find(|r| r.id == id).map(|r| r.scores.as_slice())
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Header of titles (if any), then `id<TAB>score...` per row.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> Result<()> {
        if !self.titles.is_empty() {
            writeln!(writer, "{}", self.titles.join("\t"))?;
        }
        for row in &self.rows {
            let scores: Vec<String> = row.scores.iter().map(|s| s.to_string()).collect();
            writeln!(writer, "{}\t{}", row.id, scores.join("\t"))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// `.tsv` / `.txt` paths get TSV, anything else JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let writer = BufWriter::new(file);

        match path.extension().and_then(|e| e.to_str()) {
            Some("tsv") | Some("txt") => self.write_tsv(writer)?,
            _ => self.write_json(writer)?,
        }
        info!(
            path = %path.display(),
            rows = self.rows.len(),
            failures = self.failures.len(),
            "Saved report"
        );
        Ok(())
    }
}
