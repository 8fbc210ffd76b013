use std::fmt::{self, Display, Formatter};

use smol_str::SmolStr;

use crate::range::Range;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub range: Range,
    pub kind: TokenKind,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum TokenKind {
    /// Literal text with `$$` already unescaped.
    Text(String),
    /// `$name`, `$name.field`, `${name}` or `${name.field}`.
    Variable {
        name: SmolStr,
        field: Option<SmolStr>,
        braced: bool,
    },
}

impl Token {
    pub fn is_variable(&self) -> bool {
        matches!(self.kind, TokenKind::Variable { .. })
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.kind)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            TokenKind::Text(text) => write!(f, "{}", text.replace('$', "$$")),
            TokenKind::Variable {
                name,
                field,
                braced,
            } => {
                let (open, close) = if *braced { ("${", "}") } else { ("$", "") };
                match field {
                    Some(field) => write!(f, "{open}{name}.{field}{close}"),
                    None => write!(f, "{open}{name}{close}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::text(TokenKind::Text("a $ b".to_string()), "a $$ b")]
    #[case::variable(TokenKind::Variable { name: "host".into(), field: None, braced: false }, "$host")]
    #[case::braced_variable(TokenKind::Variable { name: "host".into(), field: None, braced: true }, "${host}")]
    #[case::field(TokenKind::Variable { name: "header".into(), field: Some("X-Trace".into()), braced: false }, "$header.X-Trace")]
    #[case::braced_field(TokenKind::Variable { name: "arg".into(), field: Some("a b".into()), braced: true }, "${arg.a b}")]
    fn test_display(#[case] kind: TokenKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }
}
