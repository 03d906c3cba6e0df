use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::persist::cache_path_for;
use engine::{
    create, CacheFormat, Collection, CreateOptions, ScoringConfig, SearchOptions, Searcher, StemmingTokenizer,
};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build, cache and query a positional tf-idf index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Bincode,
}

impl From<Format> for CacheFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => CacheFormat::Json,
            Format::Bincode => CacheFormat::Bincode,
        }
    }
}

#[derive(Args)]
struct CollectionArgs {
    /// Source collection: JSON object of doc_id -> {title, content, url, date, tags}
    #[arg(long)]
    source: PathBuf,
    /// Rebuild from the source without reading or writing the cache
    #[arg(long, default_value_t = false)]
    no_cache: bool,
    /// Cache encoding
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Cache file; defaults to the source path plus ".cache"
    #[arg(long)]
    cache_path: Option<PathBuf>,
    /// Keep only the top R postings per term (approximate ranking)
    #[arg(long)]
    champions: Option<usize>,
    /// JSON file overriding scoring weights
    #[arg(long)]
    config: Option<PathBuf>,
}

impl CollectionArgs {
    fn scoring_config(&self) -> Result<ScoringConfig> {
        Ok(match &self.config {
            Some(path) => ScoringConfig::from_path(path)?,
            None => ScoringConfig::default(),
        })
    }

    fn create_options(&self) -> CreateOptions {
        CreateOptions {
            cache: !self.no_cache,
            champions_r: self.champions,
            format: self.format.into(),
            cache_path: self.cache_path.clone(),
        }
    }

    fn load(&self, tokenizer: &StemmingTokenizer, config: &ScoringConfig) -> Result<Collection> {
        let start = Instant::now();
        let collection = create(&self.source, tokenizer, config, &self.create_options())?;
        tracing::info!(
            num_docs = collection.num_docs(),
            num_terms = collection.index().len(),
            took_s = start.elapsed().as_secs_f64(),
            "collection ready"
        );
        Ok(collection)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and write its cache
    Build {
        #[command(flatten)]
        collection: CollectionArgs,
    },
    /// Run one query and print the ranked documents
    Search {
        #[command(flatten)]
        collection: CollectionArgs,
        /// Query text
        #[arg(long, short)]
        query: String,
        /// Number of results
        #[arg(long, short, default_value_t = 10)]
        k: usize,
        /// Disable the recency boost
        #[arg(long, default_value_t = false)]
        no_date: bool,
        /// Disable the phrase-proximity multiplier
        #[arg(long, default_value_t = false)]
        no_phrase: bool,
    },
    /// Print the terms found in the most documents
    Stats {
        #[command(flatten)]
        collection: CollectionArgs,
        #[arg(long, default_value_t = 50)]
        top: usize,
    },
    /// Print the document frequency of one term (after tokenization)
    Term {
        #[command(flatten)]
        collection: CollectionArgs,
        #[arg(long)]
        term: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let tokenizer = StemmingTokenizer::new();

    match cli.command {
        Commands::Build { collection } => build(&collection, &tokenizer),
        Commands::Search { collection, query, k, no_date, no_phrase } => {
            let config = collection.scoring_config()?;
            let loaded = collection.load(&tokenizer, &config)?;
            let options = SearchOptions { date_score: !no_date, phrase_score: !no_phrase, ..Default::default() };
            let results = Searcher::new(&loaded, &tokenizer, &config).search(&query, k, &options);
            if results.is_empty() {
                println!("No results for {query:?}");
            }
            for (doc, score) in results {
                println!("ID: {} | Score: {:.6}", doc.id, score);
                println!("Title: {}", doc.title);
                if let Some(url) = &doc.url {
                    println!("URL: {url}");
                }
                println!("------");
            }
            Ok(())
        }
        Commands::Stats { collection, top } => {
            let config = collection.scoring_config()?;
            let loaded = collection.load(&tokenizer, &config)?;
            for (term, df) in loaded.most_frequent_terms(top) {
                println!("{term} : {df}");
            }
            Ok(())
        }
        Commands::Term { collection, term } => {
            let config = collection.scoring_config()?;
            let loaded = collection.load(&tokenizer, &config)?;
            let tokens = engine::Tokenizer::tokenize(&tokenizer, &term);
            let normalized = tokens.first().map(String::as_str).unwrap_or(term.as_str());
            println!("Frequency of {} in all documents={}", term, loaded.document_frequency(normalized));
            Ok(())
        }
    }
}

fn build(args: &CollectionArgs, tokenizer: &StemmingTokenizer) -> Result<()> {
    let config = args.scoring_config()?;
    let collection = args.load(tokenizer, &config)?;
    let cache = args
        .cache_path
        .clone()
        .unwrap_or_else(|| cache_path_for(&args.source, args.format.into()));
    let finished = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    if args.no_cache {
        tracing::info!(num_docs = collection.num_docs(), finished = %finished, "index built without cache");
    } else {
        tracing::info!(cache = %cache.display(), num_docs = collection.num_docs(), finished = %finished, "index build complete");
    }
    Ok(())
}
