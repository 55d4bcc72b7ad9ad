// End-to-end tests through the public API: corpus loading, DF counting,
// table persistence, and scoring in both IDF modes.

use std::io::Cursor;

use anyhow::Result;
use ciderd::{
    CiderError, CiderScorer, CorpusLoader, DfCounter, DfKind, DfTable, IdfMode, MalformedPolicy,
    NGram, Pipeline, WhitespaceTokenizer,
};

const CORPUS: &str = r#"{"text": "a b"}
{"text": "a c"}
{"text": "b c"}
"#;

fn load_corpus() -> Result<ciderd::Corpus> {
    CorpusLoader::default().load_from_reader(Cursor::new(CORPUS), "three-docs")
}

// ============================================================
// DF engine
// ============================================================

#[test]
fn raw_count_table_contains_a_2() -> Result<()> {
    let table = DfCounter::new().count(&load_corpus()?)?;
    let mut out = Vec::new();
    table.write_to(&mut out)?;
    let text = String::from_utf8(out)?;
    assert!(text.lines().any(|l| l == "a 2"), "{}", text);
    assert!(text.lines().any(|l| l == "a b 1"), "{}", text);
    Ok(())
}

#[test]
fn idf_is_non_negative() -> Result<()> {
    let corpus = CorpusLoader::default().load_from_reader(
        Cursor::new("{\"text\": \"x y x\"}\n{\"text\": \"x\"}\n{\"text\": \"y z w v\"}\n"),
        "mem",
    )?;
    let table = DfCounter::new().output(DfKind::LogIdf).count(&corpus)?;
    assert!(!table.is_empty());
    assert!(table.iter().all(|(_, idf)| idf >= 0.0));
    Ok(())
}

#[test]
fn table_survives_write_and_read() -> Result<()> {
    let corpus = load_corpus()?;
    let counts = DfCounter::new().count(&corpus)?;

    let mut out = Vec::new();
    counts.write_to(&mut out)?;
    let reloaded = DfTable::read_from(Cursor::new(out), DfKind::Count, MalformedPolicy::Abort)?
        .with_corpus_size(corpus.len());

    let expected = counts.to_log_idf(None)?;
    let actual = reloaded.to_log_idf(None)?;
    for (gram, idf) in expected.iter() {
        assert!((actual.get(gram).unwrap() - idf).abs() < 1e-12, "{}", gram);
    }
    Ok(())
}

#[test]
fn empty_corpus_fails_the_build() -> Result<()> {
    let corpus = CorpusLoader::default().load_from_reader(Cursor::new("\n\n"), "blank.jsonl")?;
    let err = DfCounter::new().count(&corpus).unwrap_err();
    assert!(err.to_string().contains("blank.jsonl"));
    Ok(())
}

// ============================================================
// Scoring engine
// ============================================================

#[test]
fn example_candidate_prefers_first_reference() -> Result<()> {
    let scorer = CiderScorer::new(Box::new(WhitespaceTokenizer::new()));
    let detailed = scorer.score_detailed("a b", &["a b", "a c"])?;

    let first = detailed.per_order[0];
    assert!((first.similarity - 1.0).abs() < 1e-6);
    assert_eq!(first.best_reference, Some(0));

    let against_second = scorer.score("a b", &["a c"])?;
    assert!(against_second < detailed.score);
    Ok(())
}

#[test]
fn caption_scored_against_itself_is_one() -> Result<()> {
    let tokenizer = WhitespaceTokenizer::new();
    let text = "a woman is slicing a tomato";
    let s = ciderd::score(text, &[text], "corpus", None, &tokenizer)?;
    assert!((s - 1.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn precomputed_scoring_uses_corpus_table() -> Result<()> {
    let table = DfCounter::new().count(&load_corpus()?)?;
    let scorer = CiderScorer::with_table(Box::new(Pipeline::default()), table)?;

    // "a b" only appears in document 1, so its bigram carries ln(3)
    let s = scorer.score_detailed("a b", &["a b", "c"])?;
    assert!((s.per_order[1].similarity - 1.0).abs() < 1e-6);
    assert!((s.score - 0.5).abs() < 1e-6);

    // n-grams missing from the table weigh nothing
    let unseen = scorer.score("q r", &["q r"])?;
    assert_eq!(unseen, 0.0);
    Ok(())
}

#[test]
fn invalid_mode_names_the_value() {
    let err = "tf-idf".parse::<IdfMode>().unwrap_err();
    assert!(matches!(err, CiderError::InvalidMode(ref m) if m == "tf-idf"));
    assert!(err.to_string().contains("tf-idf"));
}

#[test]
fn scores_stay_in_unit_interval() -> Result<()> {
    let scorer = CiderScorer::new(Box::new(WhitespaceTokenizer::new()));
    let refs = [
        "a woman is slicing a tomato",
        "someone cuts a tomato with a knife",
        "a tomato is being sliced",
    ];
    for cand in ["a woman slicing a tomato", "a tomato", "the cat", "a a a a a", ""] {
        let s = scorer.score(cand, &refs)?;
        assert!((0.0..=1.0).contains(&s), "{} -> {}", cand, s);
    }
    Ok(())
}

#[test]
fn ngram_display_matches_table_format() {
    assert_eq!(NGram::from_slice(&["一隻", "貓"]).to_string(), "一隻 貓");
}
