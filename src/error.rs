//! Error types shared by the lexer, parser and printer.

use std::io;

use thiserror::Error;

use crate::types::Position;

/// Result type for every fallible CSV operation.
pub type Result<T> = std::result::Result<T, CsvError>;

/// The rule a piece of malformed input broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// A quoted field was still open when the source ran out.
    #[error("EOF reached before encapsulated token finished (quote opened at {0})")]
    UnterminatedQuote(Position),

    /// A quote character showed up in the middle of an unquoted field.
    #[error("unexpected quote character `{0}` inside an unquoted field")]
    UnexpectedQuote(char),

    /// Something other than whitespace sat between a closing quote and the delimiter.
    #[error("invalid character `{0}` between encapsulated token and delimiter")]
    TrailingText(char),

    #[error("EOF whilst processing escape sequence")]
    EofInEscape,

    /// Record length does not match the header length.
    #[error("record has {found} values but the header has {expected}")]
    FieldCountMismatch { expected: usize, found: usize },

    /// A header column has a blank name.
    #[error("header name is missing at column {column}")]
    MissingHeaderName { column: usize },
}

/// Errors raised while configuring, parsing or printing CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The format descriptor is not usable.
    #[error("Invalid format: {0}")]
    Configuration(String),

    /// The input broke a tokenizing or record-shape rule.
    #[error("Malformed CSV at record {record} ({position}): {violation}")]
    MalformedInput {
        record: u64,
        position: Position,
        violation: Violation,
    },

    /// The header row names the same column twice.
    #[error("Duplicate header name `{name}` ({position})")]
    DuplicateHeaderName { name: String, position: Position },

    /// Source or sink failure, passed through untouched.
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Not field at given index `{0}`.")]
    NotAField(usize),

    #[error("Invalid Column: `{0}`. Not found in header.")]
    InvalidColumn(String),

    #[error("No header mapping was specified, record values can't be accessed by name.")]
    NoHeader,

    #[error("Error parsing field `{0}` with value `{1}` into `{2}`.")]
    ConversionError(usize, String, String),
}

impl CsvError {
    pub(crate) fn malformed(record: u64, position: Position, violation: Violation) -> Self {
        CsvError::MalformedInput {
            record,
            position,
            violation,
        }
    }

    /// Stamps the record number on a malformed-input error raised by the lexer.
    pub(crate) fn at_record(self, record: u64) -> Self {
        match self {
            CsvError::MalformedInput {
                position,
                violation,
                ..
            } => CsvError::malformed(record, position, violation),
            other => other,
        }
    }

    /// True for every error caused by the shape of the input, including
    /// duplicate header names.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CsvError::MalformedInput { .. } | CsvError::DuplicateHeaderName { .. }
        )
    }

    /// The rule that was broken, if this is a [`CsvError::MalformedInput`].
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            CsvError::MalformedInput { violation, .. } => Some(violation),
            _ => None,
        }
    }

    /// Where in the source the error was detected, when known.
    pub fn position(&self) -> Option<Position> {
        match self {
            CsvError::MalformedInput { position, .. }
            | CsvError::DuplicateHeaderName { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl From<CsvError> for String {
    fn from(value: CsvError) -> Self {
        value.to_string()
    }
}
