//! Command-line interface definition using clap.
//!
//! Two stages, exposed as subcommands:
//! - `extract` — pull a group's history from the API into the raw corpus
//! - `transform` — project the raw corpus into the normalized tables
//!
//! The API token is never a flag; it comes from the [`TOKEN_ENV`] environment
//! variable and is resolved once in `main`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::transform::Projection;

/// Environment variable holding the API access token.
pub const TOKEN_ENV: &str = "GROUPME_TOKEN";

/// Archive group chat history and normalize it into flat JSON tables.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatvault")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatvault extract 12345678
    chatvault extract 12345678 --page-size 100 --max-pages 50
    chatvault transform
    chatvault transform --only messages --only members")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// Pipeline stage to run.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch a group's message history into the raw corpus
    Extract {
        /// Identifier of the group to extract
        group_id: String,

        /// Messages per page (clamped to the API maximum of 100)
        #[arg(long, default_value_t = 20)]
        page_size: u32,

        /// Stop after this many pages (default: fetch until exhausted)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Raw-corpus directory (must already exist)
        #[arg(long, default_value = "data")]
        raw_dir: PathBuf,

        /// Write raw files as {"messages": [...]} instead of a bare array
        #[arg(long)]
        wrapped: bool,
    },

    /// Project the raw corpus into normalized output tables
    Transform {
        /// Raw-corpus directory to scan
        #[arg(long, default_value = "data")]
        raw_dir: PathBuf,

        /// Directory for the normalized tables
        #[arg(long, default_value = "data/formatted")]
        out_dir: PathBuf,

        /// Run only the named projection (repeatable; default: all six)
        #[arg(long = "only", value_enum)]
        only: Vec<Projection>,
    },
}
