use crate::document::{Corpus, Document};
use crate::tokenizer::{Pipeline, Tokenizer};
use anyhow::{anyhow, bail, Context, Result};
use flate2::read::GzDecoder;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// JSON pointer of the text field when none is configured.
pub const DEFAULT_FIELD: &str = "/text";

/// Open a file for line reading, decompressing `.gz` files on the fly.
pub fn open_lines<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    if path.extension().map_or(false, |ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads JSONL records and turns one field per record into a document.
pub struct CorpusLoader {
    field: String,
    pipeline: Pipeline,
}

impl CorpusLoader {
    pub fn new(field: impl Into<String>, pipeline: Pipeline) -> Self {
        Self {
            field: field.into(),
            pipeline,
        }
    }

    /// Load a corpus from a JSONL (or JSONL.gz) file.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Corpus> {
        let path = path.as_ref();
        let reader = open_lines(path)?;
        let corpus = self.load_from_reader(reader, path.display().to_string())?;
        info!(
            path = %path.display(),
            documents = corpus.len(),
            "Loaded corpus"
        );
        Ok(corpus)
    }

    /// Load a corpus from any line reader. Blank lines are skipped.
    pub fn load_from_reader<R: BufRead>(
        &self,
        reader: R,
        name: impl Into<String>,
    ) -> Result<Corpus> {
        let name = name.into();
        let mut documents = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line =
                line.with_context(|| format!("Failed to read line {} of {}", line_no, name))?;
            if line.trim().is_empty() {
                continue;
            }

            let record: Value = serde_json::from_str(&line)
                .with_context(|| format!("Invalid JSON at line {} of {}", line_no, name))?;
            let text = self
                .field_text(&record)
                .with_context(|| format!("Bad record at line {} of {}", line_no, name))?;
            let tokens = self.pipeline.tokenize(&text)?;
            documents.push(Document::new(tokens));
        }

        debug!(corpus = %name, documents = documents.len(), "Parsed records");
        Ok(Corpus::new(name, documents))
    }

    fn field_text(&self, record: &Value) -> Result<String> {
        let value = record
            .pointer(&self.field)
            .ok_or_else(|| anyhow!("field '{}' not found", self.field))?;
        field_to_text(value)
    }
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD, Pipeline::default())
    }
}

/// A string field is used as is; an array of strings is joined with spaces.
fn field_to_text(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| anyhow!("array field holds a non-string element: {}", item))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(parts.join(" "))
        }
        other => bail!("expected a string or an array of strings, got {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_load_string_and_array_fields() -> Result<()> {
        let data = r#"{"text": "a b"}

{"text": ["a c", "d"]}
{"text": ""}
"#;
        let corpus = CorpusLoader::default().load_from_reader(Cursor::new(data), "mem")?;
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.documents()[0].tokens(), &["a", "b"]);
        assert_eq!(corpus.documents()[1].tokens(), &["a", "c", "d"]);
        assert!(corpus.documents()[2].is_empty());
        assert_eq!(corpus.name(), "mem");
        Ok(())
    }

    #[test]
    fn test_nested_pointer() -> Result<()> {
        let data = r#"{"zh": {"caption/tokenized/lowercase": ["一隻 貓", "在 睡覺"]}}"#;
        let loader = CorpusLoader::new("/zh/caption~1tokenized~1lowercase", Pipeline::default());
        let corpus = loader.load_from_reader(Cursor::new(data), "mem")?;
        assert_eq!(corpus.documents()[0].tokens(), &["一隻", "貓", "在", "睡覺"]);
        Ok(())
    }

    #[test]
    fn test_errors_name_the_line() {
        let data = "{\"text\": \"a\"}\n{\"other\": 1}\n";
        let err = CorpusLoader::default()
            .load_from_reader(Cursor::new(data), "mem")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));

        let err = CorpusLoader::default()
            .load_from_reader(Cursor::new("not json\n"), "mem")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));

        let err = CorpusLoader::default()
            .load_from_reader(Cursor::new("{\"text\": 3}\n"), "mem")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("expected a string"));
    }
}
