use anyhow::{bail, Result};
use ciderd::batch::load_batch;
use ciderd::{
    ContainmentKind, DfCounter, DfKind, IdfMode, MalformedPolicy, ScoreReport, Settings,
    SubstringContainment, TokenSequenceContainment,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// N-gram document frequencies and CIDEr-D-style consensus scoring
#[derive(Parser, Debug)]
#[command(name = "ciderd", author, version, about, long_about = None)]
struct Cli {
    /// JSON settings file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count document frequencies over a JSONL corpus and write a DF table
    Df {
        /// Corpus file (.jsonl or .jsonl.gz)
        #[arg(long)]
        corpus: PathBuf,

        /// Where to write the table
        #[arg(short, long, default_value = "DF.txt")]
        output: PathBuf,

        /// Write ln(|Corpus| / DF) instead of raw counts
        #[arg(long)]
        log_idf: bool,

        /// Containment test: substring or token
        #[arg(long)]
        containment: Option<ContainmentKind>,

        /// JSON pointer of the text field in each record
        #[arg(long)]
        field: Option<String>,
    },

    /// Score one candidate against references
    Score {
        #[arg(long)]
        candidate: String,

        #[arg(short, long = "reference", required = true)]
        references: Vec<String>,

        #[command(flatten)]
        idf: IdfArgs,
    },

    /// Score a JSONL batch of {id, candidates, references} records
    Batch {
        /// Batch file (.jsonl or .jsonl.gz)
        #[arg(short, long)]
        input: PathBuf,

        /// Report path (.json, or .tsv for tab-separated); stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        idf: IdfArgs,
    },
}

#[derive(clap::Args, Debug)]
struct IdfArgs {
    /// IDF mode: corpus or precomputed
    #[arg(long)]
    mode: Option<String>,

    /// DF table for precomputed mode
    #[arg(long)]
    df_table: Option<PathBuf>,

    /// DF table format: count or log-idf
    #[arg(long)]
    df_format: Option<DfKind>,

    /// |Corpus| behind a count table
    #[arg(long)]
    corpus_size: Option<usize>,

    /// Malformed table lines: abort or skip
    #[arg(long)]
    on_malformed: Option<MalformedPolicy>,
}

impl IdfArgs {
    fn apply(self, settings: &mut Settings) -> Result<()> {
        if let Some(mode) = self.mode {
            settings.idf_mode = mode.parse::<IdfMode>()?;
        }
        if self.df_table.is_some() {
            settings.df_table = self.df_table;
        }
        if let Some(format) = self.df_format {
            settings.df_format = format;
        }
        if self.corpus_size.is_some() {
            settings.corpus_size = self.corpus_size;
        }
        if let Some(policy) = self.on_malformed {
            settings.on_malformed = policy;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ciderd=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Df {
            corpus,
            output,
            log_idf,
            containment,
            field,
        } => {
            if let Some(c) = containment {
                settings.containment = c;
            }
            if let Some(f) = field {
                settings.corpus_field = f;
            }
            let kind = if log_idf { DfKind::LogIdf } else { DfKind::Count };
            build_df(&settings, &corpus, &output, kind)
        }
        Commands::Score {
            candidate,
            references,
            idf,
        } => {
            idf.apply(&mut settings)?;
            let scorer = settings.scorer()?;
            let score = scorer.score_detailed(&candidate, &references)?;
            for o in &score.per_order {
                println!("order {}\t{:.6}", o.order, o.similarity);
            }
            println!("score\t{:.6}", score.score);
            Ok(())
        }
        Commands::Batch { input, output, idf } => {
            idf.apply(&mut settings)?;
            run_batch(&settings, &input, output.as_deref())
        }
    }
}

fn build_df(settings: &Settings, corpus: &Path, output: &Path, kind: DfKind) -> Result<()> {
    let start = Instant::now();
    let corpus = settings.corpus_loader()?.load(corpus)?;
    info!(stats = ?corpus.stats(), "Corpus ready in {:?}", start.elapsed());

    let every = settings.progress_every.max(1);
    let progress = |done: usize, total: usize| {
        if done % every == 0 || done == total {
            info!("{} / {}", done, total);
        }
    };

    let start = Instant::now();
    let table = match settings.containment {
        ContainmentKind::Substring => DfCounter::with_containment(SubstringContainment)
            .output(kind)
            .count_with_progress(&corpus, progress)?,
        ContainmentKind::Token => DfCounter::with_containment(TokenSequenceContainment)
            .output(kind)
            .count_with_progress(&corpus, progress)?,
    };
    info!(entries = table.len(), "Counted in {:?}", start.elapsed());

    table.save(output)?;
    Ok(())
}

fn run_batch(settings: &Settings, input: &Path, output: Option<&Path>) -> Result<()> {
    let items = load_batch(input)?;
    if items.is_empty() {
        bail!("batch {} has no items", input.display());
    }

    let scorer = settings.scorer()?;
    let outcomes = scorer.score_batch_with_progress(&items, |done, total| {
        info!("Handling item {} / {}", done, total);
    });

    let report = ScoreReport::from_outcomes(settings.titles.clone(), outcomes);
    match output {
        Some(path) => report.save(path)?,
        None => report.write_json(std::io::stdout().lock())?,
    }
    if !report.failures.is_empty() {
        info!(failed = report.failures.len(), "Some items could not be scored");
    }
    Ok(())
}
