use serde::{Deserialize, Serialize};

/// A tokenized text. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    tokens: Vec<String>,
}

impl Document {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn from_slice<S: AsRef<str>>(tokens: &[S]) -> Self {
        Self::new(tokens.iter().map(|t| t.as_ref().to_string()).collect())
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens joined with no separator, the surface string used for containment.
    pub fn concatenated(&self) -> String {
        self.tokens.concat()
    }
}

impl From<Vec<String>> for Document {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

/// An ordered, fixed snapshot of documents.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    name: String,
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(name: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            name: name.into(),
            documents,
        }
    }

    /// Label used in logs and errors (usually the source path).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Corpus statistics
    pub fn stats(&self) -> CorpusStats {
        let total_tokens: usize = self.documents.iter().map(Document::len).sum();
        CorpusStats {
            total_documents: self.documents.len(),
            empty_documents: self.documents.iter().filter(|d| d.is_empty()).count(),
            avg_document_length: if self.documents.is_empty() {
                0.0
            } else {
                total_tokens as f64 / self.documents.len() as f64
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub empty_documents: usize,
    pub avg_document_length: f64,
}
