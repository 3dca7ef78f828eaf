use core::fmt;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Position

/// A one-based line/column location in an XML input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, position {}", self.line, self.column)
    }
}

/// Renders an optional position as an error message suffix.
///
/// Returns an empty string for `None`, otherwise ` (line L, position C)`.
///
/// # Examples
///
/// ```
/// use dcs_xml::{Position, at};
///
/// assert_eq!(at(&None), "");
/// assert_eq!(at(&Some(Position { line: 2, column: 5 })), " (line 2, position 5)");
/// ```
pub fn at(position: &Option<Position>) -> String {
    match position {
        Some(position) => format!(" ({position})"),
        None => String::new(),
    }
}

// -----------------------------------------------------------------------------
// XmlError

/// Failures raised by the XML layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum XmlError {
    /// The input is not well-formed XML.
    #[error("XML syntax error: {message}{}", at(.position))]
    Syntax {
        message: String,
        position: Option<Position>,
    },
    /// A prefix was used without an in-scope declaration.
    #[error("namespace prefix `{prefix}` is not declared{}", at(.position))]
    UnboundPrefix {
        prefix: String,
        position: Option<Position>,
    },
    /// The reader is not positioned where the caller expected.
    #[error("expecting {expected}, found {found}{}", at(.position))]
    UnexpectedNode {
        expected: &'static str,
        found: String,
        position: Option<Position>,
    },
    /// Element content could not be parsed as the requested value.
    #[error("the value `{value}` is not a valid {kind}{}", at(.position))]
    InvalidContent {
        kind: &'static str,
        value: String,
        position: Option<Position>,
    },
    /// A writer method was called in a state that does not allow it.
    #[error("invalid writer state: {0}")]
    InvalidState(&'static str),
    /// The underlying sink failed.
    #[error("failed to write XML: {0}")]
    Write(String),
}
