use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "picturedb")]
#[command(author, version, about = "Picture metadata indexer with PhotoPrism album sync")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the SQLite index (default: picturedb.sqlite)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index picture metadata from one or more directories
    Index {
        /// Directories to index
        #[arg(default_value = ".")]
        dirs: Vec<PathBuf>,

        /// Re-extract every picture, even unchanged ones
        #[arg(short, long)]
        reindex: bool,
    },

    /// Sync PhotoPrism albums to a grouping of the index
    #[command(group(
        ArgGroup::new("grouping")
            .required(true)
            .args(["query", "tag_prefix", "directory"])
    ))]
    Photoprism {
        /// Read-only SQL returning `album`, `path` and optionally `photoprism_path`
        query: Option<String>,

        /// One album per tag with this prefix, titled by the rest of the tag
        #[arg(long)]
        tag_prefix: Option<String>,

        /// One album per directory at this level
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        directory: Option<u8>,

        /// PhotoPrism URL
        #[arg(long)]
        url: Option<String>,

        /// PhotoPrism user
        #[arg(long)]
        user: Option<String>,

        /// PhotoPrism password
        #[arg(long)]
        pass: Option<String>,

        /// Remove pictures from albums they should not be in
        #[arg(long)]
        delete: bool,

        /// Maximum number of members fetched per album
        #[arg(long)]
        member_limit: Option<usize>,
    },

    /// Run a SQL statement against the index and print the result
    Sql {
        /// Statement to execute
        statement: String,
    },

    /// Check that required external tools are available
    CheckTools,
}
