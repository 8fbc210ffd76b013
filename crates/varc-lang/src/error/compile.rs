use smol_str::SmolStr;
use thiserror::Error;

use crate::lexer::error::SyntaxError;
use crate::range::Range;

type VariableName = SmolStr;
type FieldName = SmolStr;

/// Errors reported while compiling or testing a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("Unknown variable \"{1}\"")]
    UnknownVariable(Range, VariableName),
    #[error("Variable \"{1}\" does not take a field")]
    UnexpectedField(Range, VariableName),
    #[error("Variable \"{1}\" requires a field")]
    MissingField(Range, VariableName),
    #[error("Invalid field \"{2}\" for variable \"{1}\"")]
    InvalidField(Range, VariableName, FieldName),
    #[error("Too many fields, at most {1} are supported")]
    TooManyFields(Range, usize),
}

impl CompileError {
    #[cold]
    pub fn range(&self) -> &Range {
        match self {
            CompileError::Syntax(err) => err.range(),
            CompileError::UnknownVariable(range, _) => range,
            CompileError::UnexpectedField(range, _) => range,
            CompileError::MissingField(range, _) => range,
            CompileError::InvalidField(range, _, _) => range,
            CompileError::TooManyFields(range, _) => range,
        }
    }

    /// Malformed placeholder text, as opposed to a well-formed reference
    /// that failed to resolve.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            CompileError::Syntax(_)
                | CompileError::UnexpectedField(_, _)
                | CompileError::MissingField(_, _)
        )
    }
}
