use std::sync::Arc;

use crate::{
    Cache, CompiledVariable, VarcResult,
    compiler::Compiler,
    error::{self, InnerError},
    field::{Field, FieldTable},
    interpreter::Interpreter,
    registry::Registry,
};

#[derive(Debug, Clone)]
pub struct Options {
    /// Log handler failures with `tracing::warn!`.
    pub logging: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { logging: true }
    }
}

/// One configuration scope: a frozen registry plus the field table shared
/// by every template compiled through this engine.
///
/// Compiling needs `&mut self`; once all templates are compiled the engine
/// can be shared by reference and interpreted from any number of threads,
/// each context bringing its own [`Cache`].
#[derive(Debug)]
pub struct Engine<C> {
    registry: Arc<Registry<C>>,
    fields: FieldTable,
    pub(crate) options: Options,
}

impl<C> Engine<C> {
    pub fn new(registry: impl Into<Arc<Registry<C>>>) -> Self {
        Self::with_options(registry, Options::default())
    }

    pub fn with_options(registry: impl Into<Arc<Registry<C>>>, options: Options) -> Self {
        Self {
            registry: registry.into(),
            fields: FieldTable::new(),
            options,
        }
    }

    pub fn set_logging(&mut self, logging: bool) {
        self.options.logging = logging;
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    #[allow(clippy::result_large_err)]
    pub fn field(&self, index: u32) -> Result<&Field, error::Error> {
        self.fields
            .get(index)
            .map_err(|e| error::Error::from_error("", e))
    }

    #[allow(clippy::result_large_err)]
    pub fn compile(&mut self, template: &str) -> Result<CompiledVariable, error::Error> {
        Compiler::new(&self.registry)
            .compile(template, &mut self.fields)
            .map_err(|e| error::Error::from_error(template, e))
    }

    #[allow(clippy::result_large_err)]
    pub fn test(&mut self, template: &str) -> Result<(), error::Error> {
        Compiler::new(&self.registry)
            .test(template, &mut self.fields)
            .map_err(|e| error::Error::from_error(template, e))
    }

    /// A cache for one context, sized for the fields known so far.
    pub fn new_cache(&self) -> Cache {
        Cache::with_capacity(self.fields.len())
    }

    #[allow(clippy::result_large_err)]
    pub fn interpret(
        &self,
        cache: &mut Cache,
        compiled: &CompiledVariable,
        output: &mut String,
        ctx: &C,
    ) -> Result<(), error::Error> {
        self.interpreter()
            .interpret(cache, compiled, output, ctx)
            .map_err(|e| error::Error::from_error(compiled.raw(), e))
    }

    #[allow(clippy::result_large_err)]
    pub fn render(&self, cache: &mut Cache, compiled: &CompiledVariable, ctx: &C) -> VarcResult {
        if compiled.is_const() {
            return Ok(compiled.text().to_string());
        }

        let mut output = String::with_capacity(compiled.text().len());
        self.interpret(cache, compiled, &mut output, ctx)?;
        Ok(output)
    }

    /// Resolves one reference by name, e.g. `"host"` or `"header.Accept"`.
    #[allow(clippy::result_large_err)]
    pub fn get(&self, cache: &mut Cache, name: &str, ctx: &C) -> VarcResult {
        let mut output = String::new();
        self.interpreter()
            .get(cache, name, &mut output, ctx)
            .map_err(|e: InnerError| error::Error::from_error(format!("${{{name}}}"), e))?;
        Ok(output)
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn interpreter(&self) -> Interpreter<'_, C> {
        Interpreter::new(&self.registry, &self.fields).with_logging(self.options.logging)
    }
}
