//! Property-based tests for compilation and interpretation.
use proptest::prelude::*;
use varc_lang::{
    Cache, Compiler, FieldTable, HandlerError, Interpreter, Registry, RegistryBuilder,
    VariableDecl, hash_field_name,
};

fn registry() -> Registry<()> {
    let mut builder = RegistryBuilder::new();
    builder
        .register([
            VariableDecl::new("host", |_: &(), _, out: &mut String| {
                out.push_str("example.com");
                Ok(())
            }),
            VariableDecl::new("header", |_: &(), field: Option<&varc_lang::Field>, out: &mut String| {
                match field {
                    Some(field) => {
                        out.push_str(&field.name.to_lowercase());
                        Ok(())
                    }
                    None => Err(HandlerError::new("no field")),
                }
            })
            .fieldable(hash_field_name),
        ])
        .unwrap();
    builder.finalize()
}

mod strategies {
    use super::*;

    /// Text without any `$`.
    pub fn literal() -> impl Strategy<Value = String> {
        "[^$]{0,64}"
    }

    /// Fragments mixing valid and invalid placeholder syntax.
    pub fn template() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-z .:/-]{1,8}",
                Just("$$".to_string()),
                Just("$host".to_string()),
                Just("${host}".to_string()),
                Just("$host.x".to_string()),
                Just("$header".to_string()),
                "\\$header\\.[A-Za-z-]{1,6}",
                "\\$\\{header\\.[A-Za-z -]{0,6}\\}",
                Just("$nope".to_string()),
                Just("${".to_string()),
                Just("$".to_string()),
            ],
            0..8,
        )
        .prop_map(|parts| parts.concat())
    }

    pub fn field_name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-]{1,16}"
    }
}

proptest! {
    #[test]
    fn literal_round_trip(text in strategies::literal()) {
        let registry = registry();
        let mut fields = FieldTable::new();
        let compiled = Compiler::new(&registry).compile(&text, &mut fields).unwrap();

        let mut output = String::new();
        Interpreter::new(&registry, &fields)
            .interpret(&mut Cache::new(), &compiled, &mut output, &())
            .unwrap();

        prop_assert!(compiled.is_const());
        prop_assert_eq!(output, text);
    }

    #[test]
    fn tester_accepts_what_compiler_accepts(template in strategies::template()) {
        let registry = registry();
        let compiler = Compiler::new(&registry);
        let mut fields = FieldTable::new();

        let tested = compiler.test(&template, &mut fields);
        let compiled = compiler.compile(&template, &mut fields);

        prop_assert_eq!(tested.is_ok(), compiled.is_ok());
        if let (Err(tested), Err(compiled)) = (tested, compiled) {
            prop_assert_eq!(tested, compiled);
        }
    }

    #[test]
    fn intern_is_idempotent(a in strategies::field_name(), b in strategies::field_name()) {
        let registry = registry();
        let compiler = Compiler::new(&registry);
        let mut fields = FieldTable::new();

        compiler.compile(&format!("$header.{a}"), &mut fields).unwrap();
        compiler.compile(&format!("${{header.{a}}}"), &mut fields).unwrap();
        prop_assert_eq!(fields.len(), 1);

        compiler.compile(&format!("$header.{b}"), &mut fields).unwrap();
        prop_assert_eq!(fields.len(), if a == b { 1 } else { 2 });
    }
}
