//! Command line interface for the `termframe` binary.
//!
//! Kept free of library types so the build script can render a man page
//! from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command line arguments for the `termframe` binary.
#[derive(Debug, Parser)]
#[command(name = "termframe", version, about = "Inspect and dump recorded term logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Operations on a recording.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the descriptor of a recording.
    Describe(RecordingArgs),
    /// Print one line per fragment of a recording.
    Dump(DumpArgs),
}

/// Location of a recording.
#[derive(Debug, Args)]
pub struct RecordingArgs {
    /// Directory holding descriptor and segment files.
    #[arg(long, default_value = ".")]
    pub archive_dir: PathBuf,
    /// Recording to read.
    #[arg(long)]
    pub recording_id: i64,
}

/// Arguments of the `dump` subcommand.
#[derive(Debug, Args)]
pub struct DumpArgs {
    #[command(flatten)]
    pub recording: RecordingArgs,
    /// Term holding the first frame to dump.
    #[arg(long, requires_all = ["term_offset", "length"])]
    pub term_id: Option<i32>,
    /// Frame-aligned offset of the first frame within the term.
    #[arg(long, requires = "term_id")]
    pub term_offset: Option<i32>,
    /// Number of bytes to dump.
    #[arg(long, requires = "term_id")]
    pub length: Option<i64>,
    /// Fragments read per poll.
    #[arg(long, default_value_t = 10)]
    pub fragment_limit: usize,
}
