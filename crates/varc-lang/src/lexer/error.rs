use nom::error::{ErrorKind, ParseError};
use thiserror::Error;

use crate::range::{Range, Span};

/// A malformed placeholder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Missing variable name after `$` at {}", .0.start)]
    MissingName(Range),
    #[error("Unterminated variable, no closing `}}` for `${{` at {}", .0.start)]
    UnterminatedVariable(Range),
    #[error("Empty field name after `.` at {}", .0.start)]
    EmptyField(Range),
    #[error("Invalid character `{}` in variable name at {}", .1, .0.start)]
    InvalidCharacter(Range, char),
}

impl SyntaxError {
    #[cold]
    pub fn range(&self) -> &Range {
        match self {
            SyntaxError::MissingName(range) => range,
            SyntaxError::UnterminatedVariable(range) => range,
            SyntaxError::EmptyField(range) => range,
            SyntaxError::InvalidCharacter(range, _) => range,
        }
    }
}

/// Error type threaded through the nom combinators.
///
/// Recoverable errors come from nom itself and only steer `alt`; every
/// malformed placeholder is reported as a `Failure` carrying a
/// [`SyntaxError`].
#[derive(Debug, PartialEq)]
pub(crate) enum LexError<'a> {
    Nom(Span<'a>, ErrorKind),
    Syntax(SyntaxError),
}

impl<'a> ParseError<Span<'a>> for LexError<'a> {
    fn from_error_kind(input: Span<'a>, kind: ErrorKind) -> Self {
        LexError::Nom(input, kind)
    }

    fn append(_: Span<'a>, _: ErrorKind, other: Self) -> Self {
        other
    }
}
