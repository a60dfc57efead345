//! Diagnostics collected while parsing.

use std::fmt;

use thiserror::Error;

use crate::interpreter::Rejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Indentation deeper than the open nesting, or a dedent that cannot be honoured.
    UnexpectedIndentation,
    /// A marker with nothing meaningful after it.
    TokenEmpty,
    /// A jump to a section that is never declared.
    UnknownScope,
    /// A section key declared twice, when duplicates are configured as recoverable.
    DuplicateScope,
    /// Content after `<-`, which is ignored.
    TokenNonEmpty,
    FailedToInterpretCommand(Rejection),
    FailedToInterpretConditional(Rejection),
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::TokenNonEmpty => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IssueKind::UnexpectedIndentation => "UnexpectedIndentation",
            IssueKind::TokenEmpty => "TokenEmpty",
            IssueKind::UnknownScope => "UnknownScope",
            IssueKind::DuplicateScope => "DuplicateScope",
            IssueKind::TokenNonEmpty => "TokenNonEmpty",
            IssueKind::FailedToInterpretCommand(_) => "FailedToInterpretCommand",
            IssueKind::FailedToInterpretConditional(_) => "FailedToInterpretConditional",
        }
    }
}

/// A diagnostic tied to a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, line: usize, column: usize, message: impl Into<String>) -> Self {
        Issue { kind, line, column, message: message.into() }
    }

    pub fn indentation_too_deep(line: usize, column: usize) -> Self {
        Issue::new(
            IssueKind::UnexpectedIndentation,
            line,
            column,
            "the indentation is one or more level too deep, this might result in unexpected dialog flow",
        )
    }

    pub fn invalid_dedent(line: usize, column: usize) -> Self {
        Issue::new(
            IssueKind::UnexpectedIndentation,
            line,
            column,
            "dedent crosses a section boundary, the rest of the file is ignored",
        )
    }

    pub fn token_empty(line: usize, column: usize, message: impl Into<String>) -> Self {
        Issue::new(IssueKind::TokenEmpty, line, column, message)
    }

    pub fn unknown_scope(line: usize, column: usize, key: &str) -> Self {
        Issue::new(IssueKind::UnknownScope, line, column, format!("could not find section '{}' in file", key))
    }

    pub fn duplicate_scope(line: usize, column: usize, key: &str, first_line: usize) -> Self {
        Issue::new(
            IssueKind::DuplicateScope,
            line,
            column,
            format!("section '{}' is already declared on line {}", key, first_line),
        )
    }

    pub fn token_non_empty(line: usize, column: usize, text: &str) -> Self {
        Issue::new(IssueKind::TokenNonEmpty, line, column, format!("'{}' is ignored", text))
    }

    pub fn failed_command(line: usize, column: usize, rejection: Rejection) -> Self {
        let message = rejection.to_string();
        Issue::new(IssueKind::FailedToInterpretCommand(rejection), line, column, message)
    }

    pub fn failed_conditional(line: usize, column: usize, rejection: Rejection) -> Self {
        let message = rejection.to_string();
        Issue::new(IssueKind::FailedToInterpretConditional(rejection), line, column, message)
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{},{}: {}: {}", self.line, self.column, self.kind.name(), self.message)
    }
}

/// Failures that abort a parse instead of being collected as issues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("section '{key}' on line {line} is already declared on line {first_line}")]
    DuplicateScope { key: String, line: usize, first_line: usize },
}
