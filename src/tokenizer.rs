use anyhow::Result;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

/// Splits text into tokens. Must be deterministic for a fixed input.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

/// Text-to-text transform applied before tokenization (e.g. script conversion).
pub trait Normalizer {
    fn normalize(&self, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Normalizer for Identity {
    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Lowercases text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lowercase;

impl Normalizer for Lowercase {
    fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
    }
}

/// Splits on whitespace. Suits corpora that are already segmented.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceTokenizer {
    lowercase: bool,
}

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(text
            .split_whitespace()
            .map(|t| {
                if self.lowercase {
                    t.to_lowercase()
                } else {
                    t.to_string()
                }
            })
            .collect())
    }
}

/// Unicode word segmentation, lowercased, optionally stemmed.
pub struct UnicodeTokenizer {
    stemmer: Option<Stemmer>,
}

impl UnicodeTokenizer {
    pub fn new() -> Self {
        Self { stemmer: None }
    }

    pub fn with_stemmer(algorithm: Algorithm) -> Self {
        Self {
            stemmer: Some(Stemmer::create(algorithm)),
        }
    }

    /// Stemmer by language name, e.g. "english".
    pub fn with_language(language: &str) -> Result<Self> {
        let algorithm = stemmer_algorithm(language)
            .ok_or_else(|| anyhow::anyhow!("unsupported stemming language '{}'", language))?;
        Ok(Self::with_stemmer(algorithm))
    }

    fn stem_filter(&self, tokens: Vec<String>) -> Vec<String> {
        match &self.stemmer {
            Some(stemmer) => tokens
                .into_iter()
                .map(|t| stemmer.stem(&t).to_string())
                .collect(),
            None => tokens,
        }
    }
}

impl Default for UnicodeTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let tokens = text.unicode_words().map(|w| w.to_lowercase()).collect();
        Ok(self.stem_filter(tokens))
    }
}

fn stemmer_algorithm(language: &str) -> Option<Algorithm> {
    let algorithm = match language.to_ascii_lowercase().as_str() {
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "finnish" => Algorithm::Finnish,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        _ => return None,
    };
    Some(algorithm)
}

/// Normalization followed by tokenization.
pub struct Pipeline {
    normalizer: Box<dyn Normalizer>,
    tokenizer: Box<dyn Tokenizer>,
}

impl Pipeline {
    pub fn new(normalizer: Box<dyn Normalizer>, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            normalizer,
            tokenizer,
        }
    }

    pub fn analyze(&self, text: &str) -> Result<Vec<String>> {
        self.tokenizer.tokenize(&self.normalizer.normalize(text))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Box::new(Identity), Box::new(WhitespaceTokenizer::new()))
    }
}

impl Tokenizer for Pipeline {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        self.analyze(text)
    }
}
