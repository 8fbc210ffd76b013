//! Template compiler and syntax tester.
//!
//! Compilation is a single left-to-right pass: the template is tokenized
//! into text and variable tokens, every variable is looked up in the
//! [`Registry`], fieldable references are interned into the caller's
//! [`FieldTable`], and adjacent text is coalesced into one literal span.
//!
//! [`Compiler::test`] runs exactly the same pass but throws the segments
//! away, so a template accepted by `test` always compiles against the same
//! registry and field table.
//!
//! ## Example
//!
//! ```rust
//! use varc_lang::{Compiler, FieldTable, RegistryBuilder, VariableDecl};
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register([VariableDecl::new("host", |_: &(), _, out: &mut String| {
//!         out.push_str("example.com");
//!         Ok(())
//!     })])
//!     .unwrap();
//! let registry = builder.finalize();
//!
//! let mut fields = FieldTable::new();
//! let compiled = Compiler::new(&registry)
//!     .compile("Host: $host", &mut fields)
//!     .unwrap();
//! assert!(!compiled.is_const());
//! ```
pub(crate) mod compiled;
mod resolve;
#[cfg(test)]
mod test_compiler;

use compiled::{CompiledVariable, Segment};
use crate::error::compile::CompileError;
use crate::field::FieldTable;
use crate::lexer::{self, token::TokenKind};
use crate::registry::Registry;

pub(crate) use resolve::{Reference, reference};

enum Piece<'a> {
    Text(&'a str),
    Reference(Segment),
}

pub struct Compiler<'r, C> {
    registry: &'r Registry<C>,
}

impl<'r, C> Compiler<'r, C> {
    pub fn new(registry: &'r Registry<C>) -> Self {
        Self { registry }
    }

    /// Compiles `template`, interning any new fields into `fields`.
    ///
    /// On error nothing is returned; fields interned before the error
    /// stay in the table, as they do for [`Compiler::test`].
    pub fn compile(
        &self,
        template: &str,
        fields: &mut FieldTable,
    ) -> Result<CompiledVariable, CompileError> {
        let mut text = String::with_capacity(template.len());
        let mut segments = Vec::new();

        self.resolve(template, fields, |piece| match piece {
            Piece::Text(s) => {
                match segments.last_mut() {
                    Some(Segment::Literal { len, .. }) => *len += s.len() as u32,
                    _ => segments.push(Segment::Literal {
                        start: text.len() as u32,
                        len: s.len() as u32,
                    }),
                }
                text.push_str(s);
            }
            Piece::Reference(segment) => segments.push(segment),
        })?;

        tracing::debug!(template, segments = segments.len(), "template compiled");

        Ok(CompiledVariable::new(template, text, segments))
    }

    /// Validates `template` without building a compiled representation.
    pub fn test(&self, template: &str, fields: &mut FieldTable) -> Result<(), CompileError> {
        self.resolve(template, fields, |_| {})
    }

    fn resolve<F>(&self, template: &str, fields: &mut FieldTable, mut emit: F) -> Result<(), CompileError>
    where
        F: FnMut(Piece<'_>),
    {
        for token in lexer::tokenize(template)? {
            match &token.kind {
                TokenKind::Text(s) => emit(Piece::Text(s)),
                TokenKind::Variable { name, field, .. } => {
                    let segment = match reference(self.registry, token.range, name, field.as_deref())? {
                        Reference::Variable(decl) => Segment::Variable {
                            index: decl.index(),
                        },
                        Reference::Field { decl, hash, name } => {
                            let index = fields.intern(decl.index(), hash, &name).map_err(|_| {
                                CompileError::TooManyFields(token.range, FieldTable::MAX_FIELDS)
                            })?;
                            Segment::Field {
                                variable: decl.index(),
                                field: index,
                            }
                        }
                    };
                    emit(Piece::Reference(segment));
                }
            }
        }

        Ok(())
    }
}
