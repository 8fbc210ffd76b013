//! Evaluates compiled templates against a runtime context.
use crate::cache::{Cache, CacheKey};
use crate::compiler::compiled::{CompiledVariable, Segment};
use crate::compiler::{Reference, reference};
use crate::error::InnerError;
use crate::error::runtime::{HandlerError, RuntimeError};
use crate::field::{Field, FieldTable};
use crate::lexer::{self, error::SyntaxError, token::TokenKind};
use crate::range::{Position, Range};
use crate::registry::{Registry, VariableDecl};

#[derive(Debug)]
pub struct Interpreter<'a, C> {
    registry: &'a Registry<C>,
    fields: &'a FieldTable,
    logging: bool,
}

impl<'a, C> Interpreter<'a, C> {
    pub fn new(registry: &'a Registry<C>, fields: &'a FieldTable) -> Self {
        Self {
            registry,
            fields,
            logging: true,
        }
    }

    /// Enables or disables the `warn!` emitted when a handler fails.
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Appends the value of `compiled` for `ctx` to `output`.
    ///
    /// Segments are evaluated left to right and evaluation stops at the
    /// first failing handler. After an error the content of `output` is
    /// unspecified and must be discarded.
    pub fn interpret(
        &self,
        cache: &mut Cache,
        compiled: &CompiledVariable,
        output: &mut String,
        ctx: &C,
    ) -> Result<(), RuntimeError> {
        for segment in compiled.segments() {
            match *segment {
                Segment::Literal { start, len } => output.push_str(compiled.literal(start, len)),
                Segment::Variable { index } => {
                    let decl = self.decl(index)?;
                    self.variable(cache, decl, output, ctx)?;
                }
                Segment::Field { variable, field } => {
                    let decl = self.decl(variable)?;
                    let field = self.fields.get(field)?;
                    self.cached(cache, CacheKey::Field(field.index), decl, Some(field), output, ctx)?;
                }
            }
        }

        Ok(())
    }

    /// Resolves a single reference such as `host` or `header.Accept`
    /// without compiling a template.
    ///
    /// Fields that are already interned share their cache slot with
    /// compiled templates. Fields the table has never seen are resolved
    /// uncached, since the table is read-only here.
    pub fn get(
        &self,
        cache: &mut Cache,
        name: &str,
        output: &mut String,
        ctx: &C,
    ) -> Result<(), InnerError> {
        let braced = format!("${{{name}}}");
        let mut tokens = lexer::tokenize(&braced)?.into_iter();

        let token = match (tokens.next(), tokens.next()) {
            (Some(token), None) => token,
            (_, Some(extra)) => return Err(trailing(&braced, extra.range.start).into()),
            (None, None) => return Err(SyntaxError::MissingName(Range::default()).into()),
        };
        let TokenKind::Variable { name, field, .. } = &token.kind else {
            return Err(SyntaxError::MissingName(token.range).into());
        };

        match reference(self.registry, token.range, name, field.as_deref())? {
            Reference::Variable(decl) => self.variable(cache, decl, output, ctx)?,
            Reference::Field { decl, hash, name } => {
                match self.fields.find(decl.index(), hash, &name) {
                    Some(field) => self.cached(
                        cache,
                        CacheKey::Field(field.index),
                        decl,
                        Some(field),
                        output,
                        ctx,
                    )?,
                    None => {
                        let field = Field::detached(decl.index(), hash, &name);
                        decl.resolve(ctx, Some(&field), output)
                            .map_err(|err| self.failed(decl, Some(&field), err))?
                    }
                }
            }
        }

        Ok(())
    }

    fn decl(&self, index: u32) -> Result<&'a VariableDecl<C>, RuntimeError> {
        self.registry
            .get(index)
            .ok_or(RuntimeError::UnknownIndex(index))
    }

    fn variable(
        &self,
        cache: &mut Cache,
        decl: &VariableDecl<C>,
        output: &mut String,
        ctx: &C,
    ) -> Result<(), RuntimeError> {
        if decl.is_cacheable() {
            self.cached(cache, CacheKey::Variable(decl.index()), decl, None, output, ctx)
        } else {
            decl.resolve(ctx, None, output)
                .map_err(|err| self.failed(decl, None, err))
        }
    }

    fn cached(
        &self,
        cache: &mut Cache,
        key: CacheKey,
        decl: &VariableDecl<C>,
        field: Option<&Field>,
        output: &mut String,
        ctx: &C,
    ) -> Result<(), RuntimeError> {
        if let Some(value) = cache.lookup(key) {
            tracing::trace!(?key, "cache hit");
            output.push_str(value);
            return Ok(());
        }

        let mut buf = cache.take_spare();
        match decl.resolve(ctx, field, &mut buf) {
            Ok(()) => {
                output.push_str(cache.store(key, buf));
                Ok(())
            }
            Err(err) => {
                cache.recycle(buf);
                Err(self.failed(decl, field, err))
            }
        }
    }

    #[cold]
    fn failed(&self, decl: &VariableDecl<C>, field: Option<&Field>, source: HandlerError) -> RuntimeError {
        let field = field.map(|field| field.name.clone());

        if self.logging {
            tracing::warn!(
                variable = decl.name(),
                field = field.as_deref(),
                error = %source,
                "variable handler failed"
            );
        }

        RuntimeError::HandlerFailed {
            variable: decl.name().into(),
            field,
            source,
        }
    }
}

/// Error for text left over after the reference in `get`, pointing at the
/// first character that did not belong to it.
#[cold]
fn trailing(source: &str, start: Position) -> SyntaxError {
    let c = source[start.offset..].chars().next().unwrap_or('}');
    let end = Position::new(start.line, start.column + 1, start.offset + c.len_utf8());

    SyntaxError::InvalidCharacter(Range::new(start, end), c)
}
