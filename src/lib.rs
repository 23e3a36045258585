//! Rulecraft compiles textual PEG grammars into reusable parsers.
//!
//! A grammar is a list of rules (`name = expr;`). Compiling it resolves every
//! reference up front; parsing input then yields a tree of the nodes the
//! grammar asked to capture with `@name`.
//!
//! ```
//! use rulecraft::Builder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let parser = Builder::new()
//!     .from_string("list = @num {@num} ';'; num = '0'..'9'#{#'0'..'9'}; = {' '};")
//!     .entries(["list"])
//!     .build()?;
//! let tree = parser.parse("1 2 3;")?;
//! let values: Vec<_> = tree.children().iter().filter_map(|n| n.value()).collect();
//! assert_eq!(values, ["1", "2", "3"]);
//! # Ok(())
//! # }
//! ```

pub use crate::builder::Builder;
pub use crate::engine::Parser;
pub use crate::errors::{Error, GrammarError, Location, ParseError};
pub use crate::grammar::{Expr, Grammar, RuleId};
pub use crate::tree::{Node, NodeKind, Span};

pub mod builder;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod grammar;
pub mod source;
pub mod tree;
