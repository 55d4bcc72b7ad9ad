use ciderd::{CiderScorer, Corpus, DfCounter, DfKind, Document, Tokenizer, WhitespaceTokenizer};

fn main() -> anyhow::Result<()> {
    println!("=== ciderd Basic Usage Example ===\n");

    let tokenizer = WhitespaceTokenizer::new().lowercase(true);

    // A tiny background corpus of captions
    let captions = [
        "a man riding a horse on the beach",
        "a dog running on the beach",
        "two cats sleeping on a sofa",
        "a man playing guitar on the street",
    ];
    let documents = captions
        .iter()
        .map(|c| tokenizer.tokenize(c).map(Document::new))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let corpus = Corpus::new("demo", documents);

    // Example 1: document frequencies
    println!("--- Example 1: Document frequencies ---");
    let table = DfCounter::new().count_with_progress(&corpus, |done, total| {
        if done == total {
            println!("Scanned {} distinct n-grams", total);
        }
    })?;
    let mut out = Vec::new();
    table.write_to(&mut out)?;
    for line in String::from_utf8(out)?.lines().take(8) {
        println!("  {}", line);
    }

    // Example 2: log-IDF variant
    println!("\n--- Example 2: Log-IDF table ---");
    let idf = DfCounter::new().output(DfKind::LogIdf).count(&corpus)?;
    println!("{} entries, kind {}", idf.len(), idf.kind());

    // Example 3: corpus-relative scoring
    println!("\n--- Example 3: Corpus-relative scoring ---");
    let references = ["a man rides a horse along the beach", "a person on a horse near the sea"];
    let scorer = CiderScorer::new(Box::new(tokenizer.clone()));
    for candidate in ["a man riding a horse on the beach", "two cats on a sofa"] {
        let score = scorer.score_detailed(candidate, &references)?;
        println!("[{:.4}] {}", score.score, candidate);
        for o in &score.per_order {
            println!("   order {}: {:.4}", o.order, o.similarity);
        }
    }

    // Example 4: scoring against the precomputed table
    println!("\n--- Example 4: Precomputed IDF ---");
    let scorer = CiderScorer::with_table(Box::new(tokenizer), table)?;
    let score = scorer.score("a man riding a horse on the beach", &references)?;
    println!("[{:.4}] with corpus DF table", score);

    println!("\n=== Example Complete ===");

    Ok(())
}
