use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "corpagent", about = "ADGM corporate document compliance review")]
pub struct Cli {
    /// Extra TOML config merged after config.toml and config.<env>.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review uploaded documents and write annotated copies plus report.json
    Review {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Query the reference corpus
    Search {
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Print the best citation for a query as JSON
    Cite {
        query: String,
    },
    /// Show how a text file would be chunked
    Chunks {
        file: PathBuf,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// List the compliance rules and process requirements
    Rules,
}
