use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use irs_core::cleanup::{filter_collection, load_stop_word_list, stop_words_by_frequency};
use irs_core::persist::{load_collection, load_stop_words, save_collection, save_meta, save_stop_words, DataPaths, MetaFile};
use irs_core::porter::stem_all;
use irs_core::DocId;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

mod extract;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Extract and manage document collections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract documents from a text file or a directory of text files
    Extract {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Output data directory
        #[arg(long)]
        output: PathBuf,
        /// Fill filtered terms using the stopword list of the output directory
        #[arg(long, default_value_t = false)]
        filter_stopwords: bool,
        /// Fill stemmed terms
        #[arg(long, default_value_t = false)]
        stem: bool,
    },
    /// Write the stopword list of a data directory
    Stopwords {
        #[arg(long)]
        output: PathBuf,
        /// Import a .txt or .json stopword list
        #[arg(long, conflicts_with = "crouch")]
        from: Option<PathBuf>,
        /// Derive stopwords from term frequencies of the stored collection
        #[arg(long, default_value_t = false)]
        crouch: bool,
    },
    /// List document ids and titles
    List {
        #[arg(long)]
        data: PathBuf,
    },
    /// Print one document as JSON
    Show {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        id: DocId,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { input, output, filter_stopwords, stem } => {
            extract_to(&input, &output, filter_stopwords, stem)
        }
        Commands::Stopwords { output, from, crouch } => write_stop_words(&output, from.as_deref(), crouch),
        Commands::List { data } => {
            for doc in load_collection(&DataPaths::new(data))? {
                println!("{}\t{}", doc.document_id, doc.title);
            }
            Ok(())
        }
        Commands::Show { data, id } => {
            let collection = load_collection(&DataPaths::new(data))?;
            match collection.get(id as usize) {
                Some(doc) => {
                    println!("{}", serde_json::to_string_pretty(doc)?);
                    Ok(())
                }
                None => bail!("no document with id {id}"),
            }
        }
    }
}

fn extract_to(input: &Path, output: &Path, filter_stopwords: bool, stem: bool) -> Result<()> {
    let paths = DataPaths::new(output);
    let mut collection = extract::extract_path(input)?;
    if collection.is_empty() {
        tracing::warn!(input = %input.display(), "no documents extracted");
    }
    if filter_stopwords {
        let stop_words = load_stop_words(&paths)?;
        filter_collection(&mut collection, &stop_words);
    }
    if stem {
        stem_all(&mut collection);
    }
    save_collection(&paths, &collection)?;
    let meta = MetaFile {
        num_docs: collection.len() as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&paths, &meta)?;
    tracing::info!(output = %output.display(), num_docs = collection.len(), "collection written");
    Ok(())
}

fn write_stop_words(output: &Path, from: Option<&Path>, crouch: bool) -> Result<()> {
    let paths = DataPaths::new(output);
    let stop_words = match (from, crouch) {
        (Some(file), _) => load_stop_word_list(file)?,
        (None, true) => stop_words_by_frequency(&load_collection(&paths)?),
        (None, false) => bail!("either --from or --crouch is required"),
    };
    save_stop_words(&paths, &stop_words)?;
    tracing::info!(output = %output.display(), count = stop_words.len(), "stopwords written");
    Ok(())
}
