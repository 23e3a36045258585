//! Handles all user-facing output for the CLI.
//!
//! Status lines and tree outlines are colorized with `termcolor`; errors go
//! through `miette` in `cli::run`.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::engine::Parser;
use crate::tree::{Node, NodeKind};

/// Prints `label` in bold `color`, then `message`.
pub fn print_status(label: &str, color: Color, message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = write_status(&mut stdout, label, color, message);
}

pub fn write_status(
    out: &mut impl WriteColor,
    label: &str,
    color: Color,
    message: &str,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label:>8}")?;
    out.reset()?;
    writeln!(out, " {message}")
}

/// Prints a tree outline to stdout.
pub fn print_tree(node: &Node, parser: &Parser) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = write_tree(&mut stdout, node, parser, 0);
}

/// Writes one node per line, rule names highlighted, leaf values quoted.
pub fn write_tree(
    out: &mut impl WriteColor,
    node: &Node,
    parser: &Parser,
    depth: usize,
) -> io::Result<()> {
    write!(out, "{}", "  ".repeat(depth))?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(out, "{}", parser.by_id(node.tag))?;
    out.reset()?;

    match &node.kind {
        NodeKind::Leaf(value) => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, " {value:?}")?;
            out.reset()?;
            writeln!(out)
        }
        NodeKind::Branch(children) => {
            writeln!(out)?;
            for child in children {
                write_tree(out, child, parser, depth + 1)?;
            }
            Ok(())
        }
    }
}
