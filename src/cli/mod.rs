//! CLI module for ragkit
//!
//! Provides command-line interface parsing for the `ragkit` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragkit - minimal retrieval-augmented generation pipeline
#[derive(Parser, Debug)]
#[command(
    name = "ragkit",
    version,
    about = "ragkit - ingest, index and query plain-text documents",
    long_about = "Chunks plain-text documents, embeds them into a flat inner-product index,\n\
                  and answers questions from the closest chunks.\n\n\
                  Run without arguments to start the HTTP server.",
    after_help = "EXAMPLES:\n    \
                  ragkit ingest                         # data/raw -> data/processed\n    \
                  ragkit build                          # data/processed -> models/index\n    \
                  ragkit query \"Where did the cat sit?\" # one-shot query\n    \
                  ragkit --config my.toml serve         # start the server"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "ragkit.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Override [server].host
        #[arg(long)]
        host: Option<String>,

        /// Override [server].port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Clean and chunk raw text files into processed chunk files
    Ingest {
        /// Directory of raw .txt files (default: [paths].raw_dir)
        #[arg(long)]
        raw: Option<PathBuf>,

        /// Output directory (default: [paths].processed_dir)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Chunk budget in characters (default: [rag].chunk_max_len)
        #[arg(long)]
        max_len: Option<usize>,
    },

    /// Embed processed chunks and write the index pair
    Build {
        /// Directory of processed chunk files (default: [paths].processed_dir)
        #[arg(long)]
        processed: Option<PathBuf>,

        /// Index output directory (default: [paths].index_dir)
        #[arg(long)]
        index: Option<PathBuf>,
    },

    /// Answer a single question against the built index
    Query {
        /// The question to answer
        question: String,

        /// Number of chunks to retrieve (default: [rag].default_top_k)
        #[arg(short, long, allow_negative_numbers = true)]
        k: Option<i64>,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file and exit
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
