use rstest::{fixture, rstest};

use super::*;
use crate::error::runtime::HandlerError;
use crate::field::{Field, hash_field_name};
use crate::lexer::error::SyntaxError;
use crate::range::Range;
use crate::registry::{RegistryBuilder, VariableDecl};

fn no_spaces(field: &str) -> Option<u64> {
    if field.contains(' ') {
        None
    } else {
        hash_field_name(field)
    }
}

fn handler(_: &(), _: Option<&Field>, _: &mut String) -> Result<(), HandlerError> {
    Ok(())
}

#[fixture]
fn registry() -> Registry<()> {
    let mut builder = RegistryBuilder::new();
    builder
        .register([
            VariableDecl::new("host", handler),
            VariableDecl::new("uri", handler),
            VariableDecl::new("time", handler).cacheable(),
            VariableDecl::new("header", handler).fieldable(hash_field_name),
            VariableDecl::new("arg", handler).fieldable(no_spaces),
        ])
        .unwrap();
    builder.finalize()
}

#[rstest]
fn test_compile_plain_text(registry: Registry<()>) {
    let mut fields = FieldTable::new();
    let compiled = Compiler::new(&registry)
        .compile("plain text", &mut fields)
        .unwrap();

    assert!(compiled.is_const());
    assert_eq!(compiled.text(), "plain text");
    assert_eq!(compiled.segments(), &[Segment::Literal { start: 0, len: 10 }]);
    assert!(fields.is_empty());
}

#[rstest]
fn test_compile_empty(registry: Registry<()>) {
    let mut fields = FieldTable::new();
    let compiled = Compiler::new(&registry).compile("", &mut fields).unwrap();

    assert!(compiled.is_const());
    assert!(compiled.segments().is_empty());
    assert_eq!(compiled.raw(), "");
}

#[rstest]
fn test_compile_coalesces_escaped_dollar(registry: Registry<()>) {
    let mut fields = FieldTable::new();
    let compiled = Compiler::new(&registry)
        .compile("cost: $$5 for $host", &mut fields)
        .unwrap();

    assert_eq!(
        compiled.segments(),
        &[
            Segment::Literal { start: 0, len: 13 },
            Segment::Variable { index: 0 },
        ]
    );
    assert_eq!(compiled.literal(0, 13), "cost: $5 for ");
    assert_eq!(compiled.to_string(), "cost: $$5 for $host");
}

#[rstest]
fn test_compile_mixed(registry: Registry<()>) {
    let mut fields = FieldTable::new();
    let compiled = Compiler::new(&registry)
        .compile("${host}$uri?t=$header.X-Trace&a=${arg.q}", &mut fields)
        .unwrap();

    assert_eq!(
        compiled.segments(),
        &[
            Segment::Variable { index: 0 },
            Segment::Variable { index: 1 },
            Segment::Literal { start: 0, len: 3 },
            Segment::Field {
                variable: 3,
                field: 0
            },
            Segment::Literal { start: 3, len: 3 },
            Segment::Field {
                variable: 4,
                field: 1
            },
        ]
    );
    assert_eq!(compiled.text(), "?t=&a=");
    assert_eq!(compiled.references().count(), 4);
    assert_eq!(fields.len(), 2);
    assert_eq!(fields.get(0).unwrap().name, "X-Trace");
    assert_eq!(fields.get(1).unwrap().name, "q");
}

#[rstest]
fn test_compile_reuses_fields_across_templates(registry: Registry<()>) {
    let mut fields = FieldTable::new();
    let compiler = Compiler::new(&registry);
    let first = compiler.compile("$header.Accept", &mut fields).unwrap();
    let second = compiler
        .compile("accept=${header.Accept} agent=$header.User-Agent", &mut fields)
        .unwrap();

    assert_eq!(first.references().next(), second.references().next());
    assert_eq!(fields.len(), 2);
}

#[rstest]
#[case::unknown("$status", CompileError::UnknownVariable(Range::default(), "status".into()))]
#[case::unexpected_field("$host.name", CompileError::UnexpectedField(Range::default(), "host".into()))]
#[case::missing_field("${header}", CompileError::MissingField(Range::default(), "header".into()))]
#[case::invalid_field(
    "${arg.a b}",
    CompileError::InvalidField(Range::default(), "arg".into(), "a b".into())
)]
fn test_compile_error(
    registry: Registry<()>,
    #[case] template: &str,
    #[case] expected: CompileError,
) {
    let mut fields = FieldTable::new();
    let err = Compiler::new(&registry)
        .compile(template, &mut fields)
        .unwrap_err();

    assert_eq!(
        std::mem::discriminant(&err),
        std::mem::discriminant(&expected)
    );
    assert_eq!(err.to_string(), expected.to_string());
    assert_eq!(err.range().start.offset, 0);
}

#[rstest]
fn test_compile_syntax_error(registry: Registry<()>) {
    let mut fields = FieldTable::new();
    let err = Compiler::new(&registry)
        .compile("abc ${host", &mut fields)
        .unwrap_err();

    assert!(matches!(
        err,
        CompileError::Syntax(SyntaxError::UnterminatedVariable(_))
    ));
    assert!(err.is_syntax_error());
}

#[rstest]
fn test_compile_error_keeps_earlier_fields(registry: Registry<()>) {
    let mut fields = FieldTable::new();
    let result = Compiler::new(&registry).compile("$header.Accept $nope", &mut fields);

    assert!(result.is_err());
    assert_eq!(fields.len(), 1);
}

#[rstest]
#[case("")]
#[case("$$")]
#[case("$host:$uri")]
#[case("$header.X-A ${arg.b}")]
#[case("$nope")]
#[case("${host")]
#[case("$host.x")]
#[case("${arg.a b}")]
fn test_tester_agrees_with_compiler(registry: Registry<()>, #[case] template: &str) {
    let compiler = Compiler::new(&registry);
    let mut tested = FieldTable::new();
    let mut compiled = FieldTable::new();

    let test_result = compiler.test(template, &mut tested);
    let compile_result = compiler.compile(template, &mut compiled);

    assert_eq!(test_result.err(), compile_result.err());
    assert_eq!(
        tested.iter().collect::<Vec<_>>(),
        compiled.iter().collect::<Vec<_>>()
    );
}
