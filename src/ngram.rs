use crate::error::{CiderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Highest n-gram order used by both engines.
pub const MAX_ORDER: usize = 4;

/// A contiguous run of tokens taken from one document.
///
/// Ordering is lexicographic on the token tuple, which is the order used to
/// line vectors up before the cosine step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NGram(Vec<String>);

impl NGram {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn from_slice<S: AsRef<str>>(tokens: &[S]) -> Self {
        Self(tokens.iter().map(|t| t.as_ref().to_string()).collect())
    }

    pub fn order(&self) -> usize {
        self.0.len()
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Tokens glued together with no separator (surface form).
    pub fn concatenated(&self) -> String {
        self.0.concat()
    }
}

impl fmt::Display for NGram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Check that `order` is in `1..=MAX_ORDER`.
pub fn validate_order(order: usize) -> Result<()> {
    if order == 0 || order > MAX_ORDER {
        return Err(CiderError::InvalidOrder {
            order,
            max: MAX_ORDER,
        });
    }
    Ok(())
}

/// All windows of `order` tokens, left to right.
///
/// Yields nothing when the document is shorter than `order` (or `order` is 0).
pub fn extract<S: AsRef<str>>(tokens: &[S], order: usize) -> Vec<NGram> {
    if order == 0 || tokens.len() < order {
        return Vec::new();
    }
    tokens.windows(order).map(NGram::from_slice).collect()
}

/// Occurrence counts of every n-gram of `order` in one text.
pub fn count<S: AsRef<str>>(tokens: &[S], order: usize) -> HashMap<NGram, usize> {
    let mut counts = HashMap::new();
    for ngram in extract(tokens, order) {
        *counts.entry(ngram).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_window_count_matches_length() {
        let doc = toks("a b c d e");
        for n in 1..=MAX_ORDER {
            assert_eq!(extract(&doc, n).len(), doc.len() - n + 1);
        }
        assert!(extract(&toks("a b"), 3).is_empty());
        assert!(extract(&doc, 0).is_empty());
        assert!(extract::<String>(&[], 1).is_empty());
    }

    #[test]
    fn test_extract_is_left_to_right() {
        let grams = extract(&toks("a b c"), 2);
        assert_eq!(grams[0], NGram::from_slice(&["a", "b"]));
        assert_eq!(grams[1], NGram::from_slice(&["b", "c"]));
    }

    #[test]
    fn test_count_repeated() {
        let counts = count(&toks("a b a b"), 2);
        assert_eq!(counts[&NGram::from_slice(&["a", "b"])], 2);
        assert_eq!(counts[&NGram::from_slice(&["b", "a"])], 1);
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut grams = vec![
            NGram::from_slice(&["b"]),
            NGram::from_slice(&["a", "c"]),
            NGram::from_slice(&["a", "b"]),
        ];
        grams.sort();
        assert_eq!(grams[0].to_string(), "a b");
        assert_eq!(grams[2].to_string(), "b");
        assert_eq!(NGram::from_slice(&["ab", "c"]).concatenated(), "abc");
    }

    #[test]
    fn test_validate_order() {
        assert!(validate_order(1).is_ok());
        assert!(validate_order(MAX_ORDER).is_ok());
        assert!(matches!(
            validate_order(0),
            Err(CiderError::InvalidOrder { order: 0, .. })
        ));
        assert!(validate_order(MAX_ORDER + 1).is_err());
    }
}
