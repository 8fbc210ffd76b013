use smol_str::SmolStr;

use crate::error::compile::CompileError;
use crate::range::Range;
use crate::registry::{Registry, VariableDecl};

/// A reference whose name has been looked up and whose selector, if any,
/// has been validated against the declaration.
pub(crate) enum Reference<'r, C> {
    Variable(&'r VariableDecl<C>),
    Field {
        decl: &'r VariableDecl<C>,
        hash: u16,
        /// Selector as it is interned, after normalization.
        name: SmolStr,
    },
}

pub(crate) fn reference<'r, C>(
    registry: &'r Registry<C>,
    range: Range,
    name: &str,
    field: Option<&str>,
) -> Result<Reference<'r, C>, CompileError> {
    let decl = registry
        .find(name)
        .ok_or_else(|| CompileError::UnknownVariable(range, name.into()))?;

    match (decl.is_fieldable(), field) {
        (false, None) => Ok(Reference::Variable(decl)),
        (false, Some(_)) => Err(CompileError::UnexpectedField(range, name.into())),
        (true, None) => Err(CompileError::MissingField(range, name.into())),
        (true, Some(field)) => {
            let canonical = decl.canonical_field(field);
            decl.field_hash(&canonical)
                .map(|hash| Reference::Field {
                    decl,
                    hash: hash as u16,
                    name: canonical,
                })
                .ok_or_else(|| CompileError::InvalidField(range, name.into(), field.into()))
        }
    }
}
