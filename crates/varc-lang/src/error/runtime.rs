use smol_str::SmolStr;
use thiserror::Error;

use crate::field::FieldError;

/// Failure reported by a variable handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The requested value does not exist in the context, e.g. a missing
    /// request header.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(format!("{what} not found"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Variable \"{}\" failed: {source}", display_reference(.variable, .field.as_ref()))]
    HandlerFailed {
        variable: SmolStr,
        field: Option<SmolStr>,
        source: HandlerError,
    },
    #[error("No variable with index {0}")]
    UnknownIndex(u32),
    #[error(transparent)]
    Field(#[from] FieldError),
}

fn display_reference(variable: &SmolStr, field: Option<&SmolStr>) -> String {
    match field {
        Some(field) => format!("{variable}.{field}"),
        None => variable.to_string(),
    }
}
