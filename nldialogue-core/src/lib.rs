//! Parser for indentation-sensitive branching dialogue files.
//!
//! ```text
//! Normal dialogue line
//! # command for the interpreter
//! * A choice
//! 	Line only shown when picking this choice
//! 	* A guarded choice # condition #
//! 		-> Some section
//! // comment
//!
//! = Some section
//! <-
//! ```

pub mod interpreter;
pub mod issue;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod tree;

pub use interpreter::{Interpreter, NullInterpreter, Rejection};
pub use issue::{Issue, IssueKind, ParseError, Severity};
pub use lexer::Span;
pub use options::{DuplicateSections, ParserOptions};
pub use parser::{Parsed, Parser};
pub use tree::{Choice, Command, Node, NodeId, NodeKind, Section, Tree};

/// Parses `source` with default options.
pub fn parse(source: &str, interpreter: &mut dyn Interpreter) -> Result<Parsed, ParseError> {
    Parser::new(interpreter).parse(source)
}
