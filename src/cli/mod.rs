//! The Rulecraft Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. The first error aborts the run.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser as _;
use termcolor::Color;

use crate::cli::args::{Command, RulecraftArgs};
use crate::errors::{print_error, Error};
use crate::grammar::Grammar;
use crate::source::{discover, read_source};
use crate::Builder;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = RulecraftArgs::parse();

    let result = match args.command {
        Command::Check { grammar, entries } => handle_check(&grammar, entries),
        Command::Parse {
            grammar,
            entries,
            full,
            json,
            ext,
            exclude,
            paths,
        } => handle_parse(ParseRequest {
            grammar,
            entries,
            full,
            json,
            ext,
            exclude,
            paths,
        }),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

/// Handles the `check` subcommand.
fn handle_check(path: &Path, entries: Vec<String>) -> Result<(), Error> {
    let text = read_source(path)?;
    let name = display_name(path);

    let grammar = if entries.is_empty() {
        Grammar::compile(&text, &name)?
    } else {
        Builder::new()
            .from_string(text)
            .source_name(name.as_str())
            .entries(entries)
            .build()?
            .grammar()
            .clone()
    };

    let skip = if grammar.skip().is_some() {
        "with"
    } else {
        "without"
    };
    output::print_status(
        "ok",
        Color::Green,
        &format!("{name}: {} rules, {skip} skip rule", grammar.len()),
    );
    Ok(())
}

struct ParseRequest {
    grammar: PathBuf,
    entries: Vec<String>,
    full: bool,
    json: bool,
    ext: String,
    exclude: Vec<String>,
    paths: Vec<PathBuf>,
}

/// Handles the `parse` subcommand.
fn handle_parse(request: ParseRequest) -> Result<(), Error> {
    let parser = Builder::new()
        .from_string(read_source(&request.grammar)?)
        .source_name(display_name(&request.grammar))
        .entries(request.entries)
        .require_full_input(request.full)
        .build()?;

    for root in &request.paths {
        for file in discover(root, &request.ext, &request.exclude)? {
            let name = display_name(&file);
            let text = read_source(&file)?;
            if text.is_empty() {
                output::print_status("skipped", Color::Yellow, &format!("{name} (empty)"));
                continue;
            }

            let tree = parser.parse_named(&name, &text)?;
            if request.json {
                println!("{}", crate::tree::to_json(&tree, &parser)?);
            } else {
                output::print_status("parsed", Color::Green, &name);
                output::print_tree(&tree, &parser);
            }
        }
    }
    Ok(())
}
