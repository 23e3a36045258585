//! Defines the command-line arguments and subcommands for the Rulecraft CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "rulecraft",
    version,
    about = "Compile PEG grammars and inspect the parse trees they produce."
)]
pub struct RulecraftArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a grammar and report its rules.
    Check {
        /// The grammar file to compile.
        #[arg(required = true)]
        grammar: PathBuf,
        /// Entry rules that must exist.
        #[arg(short, long = "entry")]
        entries: Vec<String>,
    },
    /// Parse files with a grammar and print their trees.
    Parse {
        /// The grammar file to compile.
        #[arg(short, long)]
        grammar: PathBuf,
        /// Entry rules, tried in order.
        #[arg(short, long = "entry", required = true)]
        entries: Vec<String>,
        /// Reject input left over after the entry rule matched.
        #[arg(long)]
        full: bool,
        /// Print trees as JSON instead of an indented outline.
        #[arg(long)]
        json: bool,
        /// Extension of the files to pick up from directories.
        #[arg(long, default_value = "txt")]
        ext: String,
        /// Skip files whose name ends with this suffix.
        #[arg(long)]
        exclude: Vec<String>,
        /// Files or directories to parse.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}
