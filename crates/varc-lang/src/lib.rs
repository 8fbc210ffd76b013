//! `varc-lang` compiles strings with embedded variable references such as
//! `"Host: $host"` or `"trace=${header.X-Trace}"` once, and renders them
//! against a host-owned runtime context as often as needed.
//!
//! The host registers named variables, each backed by a handler reading
//! the context. Fieldable variables take a selector (`$header.Accept`)
//! and their values are memoized per context in a [`Cache`], so a header
//! referenced by several templates is resolved once per request.
//!
//! ## Syntax
//!
//! | Form             | Meaning                                       |
//! |------------------|-----------------------------------------------|
//! | `$$`             | a literal `$`                                 |
//! | `$name`          | variable, `name` is `[A-Za-z0-9_]+`           |
//! | `$name.field`    | field, `field` is `[A-Za-z0-9_-]+`            |
//! | `${name}`        | variable                                      |
//! | `${name.field}`  | field, `field` is anything up to `}`          |
//!
//! ## Examples
//!
//! ```rust
//! use varc_lang::{Engine, HandlerError, RegistryBuilder, VariableDecl, hash_field_name};
//!
//! struct Request {
//!     host: String,
//!     headers: Vec<(String, String)>,
//! }
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register([
//!         VariableDecl::new("host", |r: &Request, _, out: &mut String| {
//!             out.push_str(&r.host);
//!             Ok(())
//!         }),
//!         VariableDecl::new("header", |r: &Request, field: Option<&varc_lang::Field>, out: &mut String| {
//!             let name = field.map(|f| f.name.as_str()).unwrap_or_default();
//!             let (_, value) = r
//!                 .headers
//!                 .iter()
//!                 .find(|(k, _)| k.eq_ignore_ascii_case(name))
//!                 .ok_or_else(|| HandlerError::not_found(name))?;
//!             out.push_str(value);
//!             Ok(())
//!         })
//!         .fieldable(hash_field_name),
//!     ])
//!     .unwrap();
//!
//! let mut engine = Engine::new(builder.finalize());
//! let compiled = engine.compile("$host traced as ${header.X-Trace}").unwrap();
//!
//! let request = Request {
//!     host: "example.com".to_string(),
//!     headers: vec![("X-Trace".to_string(), "abc123".to_string())],
//! };
//! let mut cache = engine.new_cache();
//!
//! assert_eq!(
//!     engine.render(&mut cache, &compiled, &request).unwrap(),
//!     "example.com traced as abc123"
//! );
//! ```
mod arena;
mod cache;
mod compiler;
mod engine;
mod error;
mod field;
mod interpreter;
mod lexer;
mod range;
mod registry;

pub use arena::{Arena, ArenaId};
pub use cache::{Cache, CacheKey};
pub use compiler::Compiler;
pub use compiler::compiled::{CompiledVariable, Segment};
pub use engine::{Engine, Options};
pub use error::compile::CompileError;
pub use error::runtime::{HandlerError, RuntimeError};
pub use error::{Error, InnerError};
pub use field::{Field, FieldError, FieldTable, hash_field_name};
pub use interpreter::Interpreter;
pub use lexer::error::SyntaxError;
pub use lexer::token::{Token, TokenKind};
pub use range::{Position, Range};
pub use registry::{
    FieldHashFn, FieldNormalizeFn, Handler, Registry, RegistryBuilder, RegistryError, SharedRegistry, VariableDecl,
};

pub type VarcResult = Result<String, Error>;

/// Splits a template into text and variable tokens without resolving any
/// name.
#[allow(clippy::result_large_err)]
pub fn tokenize(template: &str) -> Result<Vec<Token>, Error> {
    lexer::tokenize(template).map_err(|e| Error::from_error(template, e))
}
