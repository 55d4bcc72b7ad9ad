use crate::corpus::open_lines;
use crate::engine::CiderScorer;
use crate::tfidf::IdfMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

/// One row of a batch: several candidates judged against shared references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub id: String,
    pub candidates: Vec<String>,
    pub references: Vec<String>,
    /// Per-item IDF mode name; the scorer's mode when absent.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Scores for one item, or the reason it could not be scored.
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: String,
    pub result: Result<Vec<f64>>,
}

/// Read batch items from JSONL (optionally gzip-compressed).
pub fn load_batch<P: AsRef<Path>>(path: P) -> Result<Vec<BatchItem>> {
    let path = path.as_ref();
    let items = read_batch(open_lines(path)?)
        .with_context(|| format!("Failed to read batch {}", path.display()))?;
    info!(path = %path.display(), items = items.len(), "Loaded batch");
    Ok(items)
}

pub fn read_batch<R: BufRead>(reader: R) -> Result<Vec<BatchItem>> {
    let mut items = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item: BatchItem = serde_json::from_str(&line)
            .with_context(|| format!("Invalid batch record at line {}", i + 1))?;
        items.push(item);
    }
    Ok(items)
}

impl CiderScorer {
    /// Score every item. A failing item is reported in its outcome and the
    /// rest of the batch still runs.
    pub fn score_batch(&self, items: &[BatchItem]) -> Vec<BatchOutcome> {
        self.score_batch_with_progress(items, |_, _| {})
    }

    pub fn score_batch_with_progress<P>(
        &self,
        items: &[BatchItem],
        mut progress: P,
    ) -> Vec<BatchOutcome>
    where
        P: FnMut(usize, usize),
    {
        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, item) in items.iter().enumerate() {
            let result = self
                .score_item(item)
                .with_context(|| format!("Failed to score item '{}'", item.id));
            if let Err(e) = &result {
                warn!(id = %item.id, error = %format!("{:#}", e), "Skipping item");
            }
            outcomes.push(BatchOutcome {
                id: item.id.clone(),
                result,
            });
            progress(i + 1, total);
        }

        outcomes
    }

    fn score_item(&self, item: &BatchItem) -> Result<Vec<f64>> {
        let mode = match &item.mode {
            Some(name) => name.parse::<IdfMode>()?,
            None => self.mode(),
        };
        item.candidates
            .iter()
            .map(|cand| -> Result<f64> {
                Ok(self.score_with_mode(cand, &item.references, mode)?.score)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CiderError;
    use crate::tokenizer::WhitespaceTokenizer;
    use std::io::Cursor;

    #[test]
    fn test_read_batch() -> Result<()> {
        let data = r#"{"id": "img1", "candidates": ["a b", "c"], "references": ["a b", "a c"]}

{"id": "img2", "candidates": ["x"], "references": ["x y"], "mode": "corpus"}
"#;
        let items = read_batch(Cursor::new(data))?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].candidates.len(), 2);
        assert_eq!(items[1].mode.as_deref(), Some("corpus"));

        assert!(read_batch(Cursor::new("{\"id\": 1}\n")).is_err());
        Ok(())
    }

    #[test]
    fn test_bad_item_does_not_stop_batch() {
        let scorer = CiderScorer::new(Box::new(WhitespaceTokenizer::new()));
        let items = vec![
            BatchItem {
                id: "bad-mode".to_string(),
                candidates: vec!["a b".to_string()],
                references: vec!["a b".to_string()],
                mode: Some("bleu".to_string()),
            },
            BatchItem {
                id: "no-refs".to_string(),
                candidates: vec!["a b".to_string()],
                references: vec![],
                mode: None,
            },
            BatchItem {
                id: "ok".to_string(),
                candidates: vec!["a b".to_string(), "a c".to_string(), "z".to_string()],
                references: vec!["a b".to_string(), "a d".to_string()],
                mode: None,
            },
        ];

        let mut seen = 0;
        let outcomes = scorer.score_batch_with_progress(&items, |done, total| {
            seen = done;
            assert_eq!(total, 3);
        });
        assert_eq!(seen, 3);

        let err = outcomes[0].result.as_ref().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CiderError>(),
            Some(CiderError::InvalidMode(m)) if m == "bleu"
        ));
        assert!(format!("{:#}", err).contains("bad-mode"));

        assert!(outcomes[1].result.is_err());

        let scores = outcomes[2].result.as_ref().unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[0] > scores[1]);
        assert_eq!(scores[2], 0.0);
    }
}
