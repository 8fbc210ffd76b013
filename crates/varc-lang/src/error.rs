pub mod compile;
pub mod runtime;

use miette::{Diagnostic, SourceOffset, SourceSpan};

use crate::{
    field::FieldError,
    lexer::error::SyntaxError,
    registry::RegistryError,
};
use compile::CompileError;
use runtime::RuntimeError;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum InnerError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl From<SyntaxError> for InnerError {
    fn from(err: SyntaxError) -> Self {
        InnerError::Compile(CompileError::Syntax(err))
    }
}

/// An error with the template it came from, rendered by miette with the
/// offending placeholder underlined.
#[derive(PartialEq, Debug, Clone, thiserror::Error)]
#[error("{cause}")]
pub struct Error {
    /// The underlying cause of the error.
    pub cause: InnerError,
    /// The template related to the error.
    pub source_code: String,
    /// The location in the template for diagnostics.
    pub location: SourceSpan,
}

impl Error {
    pub fn from_error(source_code: impl Into<String>, cause: impl Into<InnerError>) -> Self {
        let source_code = source_code.into();
        let cause = cause.into();

        let location = match &cause {
            InnerError::Compile(err) => {
                let range = err.range();
                SourceSpan::new(SourceOffset::from(range.start.offset), range.len())
            }
            InnerError::Runtime(_) | InnerError::Registry(_) | InnerError::Field(_) => {
                SourceSpan::new(SourceOffset::from(0usize), source_code.len())
            }
        };

        Self {
            cause,
            source_code,
            location,
        }
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(&self.cause, InnerError::Compile(err) if err.is_syntax_error())
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let c = match &self.cause {
            InnerError::Compile(CompileError::Syntax(SyntaxError::MissingName(_))) => {
                "SyntaxError::MissingName"
            }
            InnerError::Compile(CompileError::Syntax(SyntaxError::UnterminatedVariable(_))) => {
                "SyntaxError::UnterminatedVariable"
            }
            InnerError::Compile(CompileError::Syntax(SyntaxError::EmptyField(_))) => {
                "SyntaxError::EmptyField"
            }
            InnerError::Compile(CompileError::Syntax(SyntaxError::InvalidCharacter(_, _))) => {
                "SyntaxError::InvalidCharacter"
            }
            InnerError::Compile(CompileError::UnknownVariable(_, _)) => {
                "CompileError::UnknownVariable"
            }
            InnerError::Compile(CompileError::UnexpectedField(_, _)) => {
                "CompileError::UnexpectedField"
            }
            InnerError::Compile(CompileError::MissingField(_, _)) => "CompileError::MissingField",
            InnerError::Compile(CompileError::InvalidField(_, _, _)) => {
                "CompileError::InvalidField"
            }
            InnerError::Compile(CompileError::TooManyFields(_, _)) => {
                "CompileError::TooManyFields"
            }
            InnerError::Runtime(RuntimeError::HandlerFailed { .. }) => {
                "RuntimeError::HandlerFailed"
            }
            InnerError::Runtime(RuntimeError::UnknownIndex(_)) => "RuntimeError::UnknownIndex",
            InnerError::Runtime(RuntimeError::Field(FieldError::IndexOutOfRange(_)))
            | InnerError::Field(FieldError::IndexOutOfRange(_)) => "FieldError::IndexOutOfRange",
            InnerError::Runtime(RuntimeError::Field(FieldError::TableFull))
            | InnerError::Field(FieldError::TableFull) => "FieldError::TableFull",
            InnerError::Registry(RegistryError::DuplicateName(_)) => {
                "RegistryError::DuplicateName"
            }
            InnerError::Registry(RegistryError::RegistryClosed) => "RegistryError::RegistryClosed",
            InnerError::Registry(RegistryError::AlreadyFinalized) => {
                "RegistryError::AlreadyFinalized"
            }
        };

        Some(Box::new(c))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match &self.cause {
            InnerError::Compile(CompileError::Syntax(SyntaxError::MissingName(_))) => {
                Some("Write `$$` for a literal dollar sign.".to_string())
            }
            InnerError::Compile(CompileError::Syntax(SyntaxError::UnterminatedVariable(_))) => {
                Some("Close the variable with `}`.".to_string())
            }
            InnerError::Compile(CompileError::Syntax(SyntaxError::EmptyField(_))) => {
                Some("Name a field after the `.` or remove it.".to_string())
            }
            InnerError::Compile(CompileError::Syntax(SyntaxError::InvalidCharacter(_, _))) => {
                Some("Variable names may only contain ASCII letters, digits and `_`.".to_string())
            }
            InnerError::Compile(CompileError::UnknownVariable(_, name)) => {
                Some(format!("'{name}' is not a registered variable."))
            }
            InnerError::Compile(CompileError::UnexpectedField(_, name)) => Some(format!(
                "Use `${{{name}}}` when the variable is followed by a literal `.`."
            )),
            InnerError::Compile(CompileError::MissingField(_, name)) => {
                Some(format!("Select a field, e.g. `${{{name}.name}}`."))
            }
            InnerError::Runtime(RuntimeError::HandlerFailed { .. }) => {
                Some("Discard the output produced for this context.".to_string())
            }
            _ => None,
        };

        msg.map(|m| Box::new(m) as Box<dyn std::fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(
            miette::LabeledSpan::new_with_span(Some(format!("{}", self.cause)), self.location),
        )))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }
}
