//! Tokenizer for template strings.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! template  = { text | "$$" | variable }
//! text      = 1*( any char except "$" )
//! variable  = "$" name [ "." bare-field ]
//!           | "${" name [ "." braced-field ] "}"
//! name        = 1*( ALPHA | DIGIT | "_" )
//! bare-field  = 1*( ALPHA | DIGIT | "_" | "-" )
//! braced-field = 1*( any char except "}" )
//! ```
//!
//! A `.` after a bare name that is not followed by a field character is
//! plain text, so `"$host."` is the variable `host` followed by a dot.
pub mod error;
pub mod token;

use error::{LexError, SyntaxError};
use nom::bytes::complete::{tag, take_until, take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::multi::many0;
use nom::sequence::preceded;
use nom::{IResult, Input, Parser, branch::alt};
use token::{Token, TokenKind};

use crate::range::{Range, Span};

type LexResult<'a, T> = IResult<Span<'a>, T, LexError<'a>>;

/// Splits `input` into literal text and variable references.
///
/// Adjacent text tokens are not merged here; `$$` always yields its own
/// `Text("$")` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    match many0(token).parse(Span::new(input)) {
        Ok((rest, tokens)) if rest.fragment().is_empty() => Ok(tokens),
        Ok((rest, _)) => Err(SyntaxError::MissingName(Range::from(rest.take(0)))),
        Err(nom::Err::Failure(LexError::Syntax(e))) | Err(nom::Err::Error(LexError::Syntax(e))) => {
            Err(e)
        }
        Err(nom::Err::Failure(LexError::Nom(span, _)))
        | Err(nom::Err::Error(LexError::Nom(span, _))) => {
            Err(SyntaxError::MissingName(Range::from(span.take(0))))
        }
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::UnterminatedVariable(Range::from(
            Span::new(input),
        ))),
    }
}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[inline]
fn is_field_char(c: char) -> bool {
    is_name_char(c) || c == '-'
}

fn failure<'a, T>(error: SyntaxError) -> LexResult<'a, T> {
    Err(nom::Err::Failure(LexError::Syntax(error)))
}

/// Range covering everything consumed between `from` and `to`.
fn consumed<'a>(from: Span<'a>, to: Span<'a>) -> Range {
    Range::from(from.take(to.location_offset() - from.location_offset()))
}

fn token(input: Span) -> LexResult<Token> {
    alt((text, escaped_dollar, variable)).parse(input)
}

fn text(input: Span) -> LexResult<Token> {
    map(take_while1(|c: char| c != '$'), |span: Span| Token {
        range: span.into(),
        kind: TokenKind::Text(span.fragment().to_string()),
    })
    .parse(input)
}

fn escaped_dollar(input: Span) -> LexResult<Token> {
    map(tag("$$"), |span: Span| Token {
        range: span.into(),
        kind: TokenKind::Text("$".to_string()),
    })
    .parse(input)
}

fn dollar(input: Span) -> LexResult<char> {
    char('$').parse(input)
}

fn var_name(input: Span) -> LexResult<Span> {
    take_while1(is_name_char).parse(input)
}

fn braced_name(input: Span) -> LexResult<Span> {
    take_while(is_name_char).parse(input)
}

fn bare_field(input: Span) -> LexResult<Option<Span>> {
    opt(preceded(char('.'), take_while1(is_field_char))).parse(input)
}

fn braced_body(input: Span) -> LexResult<Span> {
    preceded(char('{'), take_until("}")).parse(input)
}

fn closing_brace(input: Span) -> LexResult<char> {
    char('}').parse(input)
}

fn variable(input: Span) -> LexResult<Token> {
    let (rest, _) = dollar(input)?;

    if rest.fragment().starts_with('{') {
        braced_variable(input, rest)
    } else {
        bare_variable(input, rest)
    }
}

fn bare_variable<'a>(input: Span<'a>, rest: Span<'a>) -> LexResult<'a, Token> {
    let Ok((rest, name)) = var_name(rest) else {
        return failure(SyntaxError::MissingName(Range::from(input.take(1))));
    };
    let (rest, field) = bare_field(rest)?;

    Ok((
        rest,
        Token {
            range: consumed(input, rest),
            kind: TokenKind::Variable {
                name: (*name.fragment()).into(),
                field: field.map(|field| (*field.fragment()).into()),
                braced: false,
            },
        },
    ))
}

fn braced_variable<'a>(input: Span<'a>, rest: Span<'a>) -> LexResult<'a, Token> {
    let Ok((rest, body)) = braced_body(rest) else {
        return failure(SyntaxError::UnterminatedVariable(Range::from(input)));
    };
    let (rest, _) = closing_brace(rest)?;
    let range = consumed(input, rest);

    let (selector, name) = braced_name(body)?;
    if name.fragment().is_empty() {
        return failure(SyntaxError::MissingName(range));
    }

    let field = match selector.fragment().chars().next() {
        None => None,
        Some('.') => {
            let field = selector.take_from(1);
            if field.fragment().is_empty() {
                return failure(SyntaxError::EmptyField(range));
            }
            Some((*field.fragment()).into())
        }
        Some(c) => {
            return failure(SyntaxError::InvalidCharacter(
                Range::from(selector.take(c.len_utf8())),
                c,
            ));
        }
    };

    Ok((
        rest,
        Token {
            range,
            kind: TokenKind::Variable {
                name: (*name.fragment()).into(),
                field,
                braced: true,
            },
        },
    ))
}
