//! A `nom`-based parser for the supported XPath 1.0 subset.

use crate::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{map, map_res, not, opt, peek, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

type PResult<'a, T> = IResult<&'a str, T>;

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(XPathError::Parse(
            input.to_string(),
            format!("unexpected trailing input '{}'", rem),
        )),
        Err(e) => Err(XPathError::Parse(input.to_string(), e.to_string())),
    }
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// A word operator (`and`, `div`, ...) that is not the prefix of a longer name.
fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(peek(take_while1(is_name_char))))
}

/// Folds `operand (op operand)*` into a left-associative tree.
fn left_assoc<'a>(
    input: &'a str,
    operand: fn(&'a str) -> PResult<'a, Expression>,
    operator: fn(&'a str) -> PResult<'a, BinaryOperator>,
) -> PResult<'a, Expression> {
    let (mut input, mut left) = operand(input)?;
    loop {
        match pair(ws(operator), operand).parse(input) {
            Ok((rest, (op, right))) => {
                left = Expression::binary(left, op, right);
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, left)),
            Err(e) => return Err(e),
        }
    }
}

// --- Operators, loosest binding first ---

fn expression(input: &str) -> PResult<'_, Expression> {
    or_expr(input)
}

fn or_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, and_expr, |i| {
        value(BinaryOperator::Or, keyword("or")).parse(i)
    })
}

fn and_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, equality_expr, |i| {
        value(BinaryOperator::And, keyword("and")).parse(i)
    })
}

fn equality_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, relational_expr, |i| {
        alt((
            value(BinaryOperator::Equals, tag("=")),
            value(BinaryOperator::NotEquals, tag("!=")),
        ))
        .parse(i)
    })
}

fn relational_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, additive_expr, |i| {
        alt((
            value(BinaryOperator::LessThanOrEqual, tag("<=")),
            value(BinaryOperator::GreaterThanOrEqual, tag(">=")),
            value(BinaryOperator::LessThan, tag("<")),
            value(BinaryOperator::GreaterThan, tag(">")),
        ))
        .parse(i)
    })
}

fn additive_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, multiplicative_expr, |i| {
        alt((
            value(BinaryOperator::Plus, char('+')),
            value(BinaryOperator::Minus, char('-')),
        ))
        .parse(i)
    })
}

fn multiplicative_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, unary_expr, |i| {
        alt((
            value(BinaryOperator::Multiply, char('*')),
            value(BinaryOperator::Divide, keyword("div")),
            value(BinaryOperator::Modulo, keyword("mod")),
        ))
        .parse(i)
    })
}

fn unary_expr(input: &str) -> PResult<'_, Expression> {
    alt((
        map(preceded(ws(char('-')), unary_expr), |e| {
            Expression::Negate(Box::new(e))
        }),
        union_expr,
    ))
    .parse(input)
}

fn union_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, path_expr, |i| {
        value(BinaryOperator::Union, char('|')).parse(i)
    })
}

// --- Paths ---

/// A primary expression optionally continued by steps (`$v/a`, `f()//b`), or
/// a plain location path. Primaries are tried first so that `count(x)` is not
/// read as a step named `count`.
fn path_expr(input: &str) -> PResult<'_, Expression> {
    if let Ok((rest, primary)) = primary_expr(input) {
        let (rest, tail) = relative_tail(rest)?;
        if tail.is_empty() {
            return Ok((rest, primary));
        }
        return Ok((
            rest,
            Expression::LocationPath(LocationPath {
                start_point: Some(Box::new(primary)),
                is_absolute: false,
                steps: tail,
            }),
        ));
    }
    map(ws(location_path), Expression::LocationPath).parse(input)
}

/// Zero or more `/step` or `//step` continuations.
fn relative_tail(input: &str) -> PResult<'_, Vec<Step>> {
    let (rest, parts) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(input)?;
    let mut steps = Vec::with_capacity(parts.len());
    for (separator, next) in parts {
        if separator == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next);
    }
    Ok((rest, steps))
}

fn location_path(input: &str) -> PResult<'_, LocationPath> {
    let (rest, is_absolute, mut steps) = if let Ok((rest, _)) = tag::<_, _, nom::error::Error<&str>>("//").parse(input) {
        let (rest, first) = step(rest)?;
        (rest, true, vec![Step::descendant_or_self(), first])
    } else if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('/').parse(input) {
        match step(rest) {
            Ok((rest, first)) => (rest, true, vec![first]),
            Err(_) => (rest, true, vec![]),
        }
    } else {
        let (rest, first) = step(input)?;
        (rest, false, vec![first])
    };

    if steps.is_empty() {
        return Ok((
            rest,
            LocationPath {
                start_point: None,
                is_absolute,
                steps,
            },
        ));
    }

    let (rest, tail) = relative_tail(rest)?;
    steps.extend(tail);
    Ok((
        rest,
        LocationPath {
            start_point: None,
            is_absolute,
            steps,
        },
    ))
}

fn step(input: &str) -> PResult<'_, Step> {
    let (rest, (axis, node_test)) = alt((
        value((Axis::Parent, NodeTest::NodeType(NodeTypeTest::Node)), tag("..")),
        value((Axis::SelfAxis, NodeTest::NodeType(NodeTypeTest::Node)), char('.')),
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| {
            (ax.unwrap_or(Axis::Child), nt)
        }),
    ))
    .parse(input)?;
    let (rest, predicates) = many0(predicate).parse(rest)?;
    Ok((
        rest,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn predicate(input: &str) -> PResult<'_, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn axis(input: &str) -> PResult<'_, Axis> {
    terminated(
        alt((
            value(Axis::Child, tag("child")),
            value(Axis::DescendantOrSelf, tag("descendant-or-self")),
            value(Axis::Descendant, tag("descendant")),
            value(Axis::Attribute, tag("attribute")),
            value(Axis::Parent, tag("parent")),
            value(Axis::Ancestor, tag("ancestor")),
            value(Axis::SelfAxis, tag("self")),
            value(Axis::FollowingSibling, tag("following-sibling")),
            value(Axis::PrecedingSibling, tag("preceding-sibling")),
        )),
        tag("::"),
    )
    .parse(input)
}

fn node_test(input: &str) -> PResult<'_, NodeTest> {
    alt((
        value(NodeTest::Wildcard(None), char('*')),
        map(terminated(nc_name, tag(":*")), |p| {
            NodeTest::Wildcard(Some(p.to_string()))
        }),
        node_type_test,
        map(name_test, NodeTest::Name),
    ))
    .parse(input)
}

fn node_type_test(input: &str) -> PResult<'_, NodeTest> {
    terminated(
        alt((
            value(NodeTypeTest::Text, keyword("text")),
            value(NodeTypeTest::Node, keyword("node")),
            value(NodeTypeTest::Comment, keyword("comment")),
        )),
        pair(ws(char('(')), char(')')),
    )
    .map(NodeTest::NodeType)
    .parse(input)
}

fn nc_name(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_name_char),
    ))
    .parse(input)
}

fn name_test(input: &str) -> PResult<'_, NameTest> {
    map(
        pair(nc_name, opt(preceded(char(':'), nc_name))),
        |(first, second)| match second {
            Some(local) => NameTest::qualified(first, local),
            None => NameTest::local(first),
        },
    )
    .parse(input)
}

// --- Primaries ---

fn primary_expr(input: &str) -> PResult<'_, Expression> {
    ws(alt((
        map(preceded(char('$'), name_test), |n| {
            Expression::Variable(n.to_string())
        }),
        map(number, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(ws(char('(')), expression, ws(char(')'))),
    )))
    .parse(input)
}

/// `digits ('.' digits?)?` or `'.' digits`. Exponents and `NaN`/`inf` are not
/// XPath 1.0 number syntax.
fn number(input: &str) -> PResult<'_, f64> {
    map_res(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        str::parse::<f64>,
    )
    .parse(input)
}

fn string_literal(input: &str) -> PResult<'_, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        )),
        str::to_string,
    )
    .parse(input)
}

fn function_call(input: &str) -> PResult<'_, Expression> {
    let (rest, name) = name_test(input)?;
    let name = name.to_string();
    // Node-type tests look like calls but belong to the step grammar.
    if matches!(name.as_str(), "text" | "node" | "comment") {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let (rest, args) = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), expression),
        ws(char(')')),
    )
    .parse(rest)?;
    Ok((rest, Expression::FunctionCall { name, args }))
}
