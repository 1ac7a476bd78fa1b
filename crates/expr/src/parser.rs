//! A `nom`-based parser for the template expression language.
//!
//! ```text
//! expression := unary (("==" | "!=") unary)?
//! unary      := "!" unary | primary
//! primary    := string | "(" expression ")" | word | number
//! word       := "true" | "false" | "null" | ident "(" args ")" | ident segment*
//! segment    := "." ident | "[" digits "]"
//! ```
use super::ast::{CompareOp, Expression, Path, PathSegment};
use crate::error::ExprError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, char, multispace0, u64 as nom_u64},
    combinator::{map, opt, recognize, value},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded},
};
use serde_json::Value;

// --- Main Public Parser ---

pub fn parse_expression(input: &str) -> Result<Expression, ExprError> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(ExprError::Parse {
            expression: input.to_string(),
            message: format!("Parser did not consume all input. Remainder: '{}'", rem),
        }),
        Err(e) => Err(ExprError::Parse {
            expression: input.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Returns true if `name` is usable as a variable or helper name.
pub fn is_identifier(name: &str) -> bool {
    matches!(identifier(name), Ok(("", _)))
}

// --- Combinators ---

fn expression(input: &str) -> IResult<&str, Expression> {
    let (input, lhs) = ws(unary).parse(input)?;
    let (input, rhs) = opt(pair(compare_op, ws(unary))).parse(input)?;
    let expr = match rhs {
        Some((op, rhs)) => Expression::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        None => lhs,
    };
    Ok((input, expr))
}

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::Ne, tag("!=")),
    ))
    .parse(input)
}

fn unary(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded(pair(char('!'), multispace0), unary), |e| {
            Expression::Not(Box::new(e))
        }),
        primary,
    ))
    .parse(input)
}

fn primary(input: &str) -> IResult<&str, Expression> {
    alt((
        map(string_literal, Expression::Literal),
        delimited(
            pair(char('('), multispace0),
            expression,
            pair(multispace0, char(')')),
        ),
        word,
        map(number, Expression::Literal),
    ))
    .parse(input)
}

// --- Literal Parsers ---

fn string_literal(input: &str) -> IResult<&str, Value> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| Value::String(s.to_string()),
    )
    .parse(input)
}

fn number(input: &str) -> IResult<&str, Value> {
    let (rest, text) = recognize(double).parse(input)?;
    let value = match text.parse::<i64>() {
        Ok(i) => Value::from(i),
        Err(_) => Value::from(text.parse::<f64>().unwrap_or(f64::NAN)),
    };
    Ok((rest, value))
}

// --- Words: keywords, calls and paths ---

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn word(input: &str) -> IResult<&str, Expression> {
    let (rest, name) = identifier(input)?;
    match name {
        "true" => return Ok((rest, Expression::Literal(Value::Bool(true)))),
        "false" => return Ok((rest, Expression::Literal(Value::Bool(false)))),
        "null" => return Ok((rest, Expression::Literal(Value::Null))),
        _ => {}
    }

    let (after_ws, _) = multispace0(rest)?;
    if after_ws.starts_with('(') {
        let (rest, args) = delimited(
            pair(char('('), multispace0),
            separated_list0(char(','), expression),
            pair(multispace0, char(')')),
        )
        .parse(after_ws)?;
        return Ok((
            rest,
            Expression::Call {
                name: name.to_string(),
                args,
            },
        ));
    }

    let (rest, segments) = many0(path_segment).parse(rest)?;
    Ok((
        rest,
        Expression::Path(Path {
            root: name.to_string(),
            segments,
        }),
    ))
}

fn key_segment(input: &str) -> IResult<&str, PathSegment> {
    map(preceded(char('.'), identifier), |s| {
        PathSegment::Key(s.to_string())
    })
    .parse(input)
}

fn index_segment(input: &str) -> IResult<&str, PathSegment> {
    map(delimited(char('['), nom_u64, char(']')), |i| {
        PathSegment::Index(i as usize)
    })
    .parse(input)
}

fn path_segment(input: &str) -> IResult<&str, PathSegment> {
    alt((key_segment, index_segment)).parse(input)
}

/// A combinator that takes a parser `inner` and produces a parser that consumes surrounding whitespace.
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}
