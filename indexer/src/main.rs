use anyhow::Result;
use clap::{Parser, Subcommand};
use engine::corpus::{index_corpus, load_corpus, load_index_corpus};
use engine::persist::save_index;
use engine::tfidf::{corpus_weights, write_weights, CorpusStatistics, WeightPaths};
use engine::CorpusPaths;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(
    about = "Build the lemma index and TF-IDF weights for an analyzed corpus",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the inverted index from a corpus directory
    Build {
        /// Corpus root holding pages/, tokens/ and lemmas/
        #[arg(long, default_value = "./corpus")]
        corpus: PathBuf,
        /// Output index file; a .bin extension writes a bincode snapshot
        #[arg(long, default_value = "./index.json")]
        output: PathBuf,
    },
    /// Write per-document TF-IDF weights for tokens and lemmas
    Tfidf {
        /// Corpus root holding pages/, tokens/ and lemmas/
        #[arg(long, default_value = "./corpus")]
        corpus: PathBuf,
        /// Output directory for tokens_tf_idf/ and lemmas_tf_idf/
        #[arg(long, default_value = "./output")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus, output } => build(&corpus, &output),
        Commands::Tfidf { corpus, output } => tfidf(&corpus, &output),
    }
}

fn build(corpus: &Path, output: &Path) -> Result<()> {
    let loaded = load_index_corpus(&CorpusPaths::new(corpus))?;
    let index = index_corpus(&loaded);
    save_index(output, &index)?;
    tracing::info!(
        output = %output.display(),
        docs = index.num_docs(),
        terms = index.num_terms(),
        rejected = loaded.rejections.len(),
        "index build complete"
    );
    Ok(())
}

fn tfidf(corpus: &Path, output: &Path) -> Result<()> {
    let loaded = load_corpus(&CorpusPaths::new(corpus))?;
    let stats = CorpusStatistics::collect(&loaded.documents);
    let paths = WeightPaths::new(output);
    for weights in corpus_weights(&loaded.documents, &stats) {
        write_weights(&paths, &weights)?;
    }
    tracing::info!(
        tokens = %paths.tokens_dir().display(),
        lemmas = %paths.lemmas_dir().display(),
        docs = loaded.documents.len(),
        "tf-idf weights written"
    );
    Ok(())
}
