//! Parser for the convertor snippet language.
//!
//! Produces the raw AST consumed by the validator:
//!
//! ```text
//! Source -> Parser -> Snippet (items + function defs)
//!                        |
//!                 Capability resolution (validator)
//!                        |
//!                 Signature comparison (validator)
//! ```
//!
//! The grammar is deliberately small: `#` comments, one statement family
//! (`let` / assignment / `if` / `while` / `return`), and expressions over
//! strings, integers, booleans, subscripts, and builtin calls. Nesting of
//! groups, call arguments, subscripts, and blocks is capped so hostile
//! input cannot blow the parse stack.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, multispace1, none_of},
    combinator::{all_consuming, cut, map, map_res, not, opt, recognize, value, verify},
    error::{context, ContextError, FromExternalError, ParseError as NomParseError},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use std::num::ParseIntError;

use crate::ast::*;
use crate::error::EngineError;
use crate::signature::TypeTag;

/// Maximum nesting of groups, call arguments, subscripts, and blocks.
pub const MAX_NESTING_DEPTH: u32 = 64;

/// Words that can never be identifiers
const RESERVED: &[&str] = &["fn", "let", "if", "else", "while", "return", "true", "false"];

// ============================================================================
// Public API
// ============================================================================

/// Parse a complete snippet from source text.
///
/// Succeeds on any well-formed module, including one with zero function
/// definitions - deciding whether a definition exists is the validator's
/// job, not the parser's.
pub fn parse_snippet(input: &str) -> Result<Snippet, EngineError> {
    match all_consuming(|i| snippet_items::<nom::error::VerboseError<&str>>(i, input))(input) {
        Ok((_, snippet)) => Ok(snippet),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(EngineError::Syntax(nom::error::convert_error(input, e)))
        }
        Err(nom::Err::Incomplete(_)) => Err(EngineError::Syntax("Incomplete input".to_string())),
    }
}

// ============================================================================
// Internal Parsers
// ============================================================================

fn snippet_items<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
) -> IResult<&'a str, Snippet, E> {
    let (input, _) = multispace0(input)?;
    let (input, items) = many0(|i| item(i, original_input))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, Snippet { items }))
}

fn item<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
) -> IResult<&'a str, Item, E> {
    let (input, _) = multispace0(input)?;
    alt((
        map(line_comment, Item::Comment),
        map(|i| function_def(i, original_input), Item::Function),
    ))(input)
}

// ============================================================================
// Comments & Whitespace
// ============================================================================

fn line_comment<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, String, E> {
    let (input, _) = char('#')(input)?;
    let (input, text) = take_while(|c| c != '\n')(input)?;
    let (input, _) = opt(char('\n'))(input)?;
    Ok((input, text.trim().to_string()))
}

/// Eat whitespace and comments, any interleaving
fn sc<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, (), E> {
    let (input, _) = many0(alt((map(multispace1, |_| ()), map(line_comment, |_| ()))))(input)?;
    Ok((input, ()))
}

// ============================================================================
// Identifiers & Keywords
// ============================================================================

/// Raw identifier-shaped word, reserved or not
fn word_chars<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn identifier<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, String, E> {
    map(
        verify(word_chars, |w: &&str| !RESERVED.contains(w)),
        |s: &str| s.to_string(),
    )(input)
}

/// Match one exact word with an identifier boundary after it
fn kw<'a, E: NomParseError<&'a str>>(
    word: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str, E> {
    verify(word_chars, move |w: &&str| *w == word)
}

// ============================================================================
// Types
// ============================================================================

fn type_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TypeTag, E> {
    alt((
        map_type,
        value(TypeTag::Str, kw("str")),
        value(TypeTag::Int, kw("int")),
        value(TypeTag::Bool, kw("bool")),
    ))(input)
}

/// `map[str, str]` - the only parameterized type in the language
fn map_type<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TypeTag, E> {
    let (input, _) = kw("map")(input)?;
    let (input, _) = cut(context(
        "map type parameters",
        tuple((
            sc,
            char('['),
            sc,
            kw("str"),
            sc,
            char(','),
            sc,
            kw("str"),
            sc,
            char(']'),
        )),
    ))(input)?;
    Ok((input, TypeTag::StrMap))
}

// ============================================================================
// Function Definitions
// ============================================================================

fn function_def<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
) -> IResult<&'a str, FunctionDef, E> {
    let start_offset = original_input.len() - input.len();

    let (input, _) = kw("fn")(input)?;
    let (input, _) = sc(input)?;
    let (input, name) = cut(context("function name", identifier))(input)?;
    let (input, _) = sc(input)?;
    let (input, _) = cut(context("parameter list", char('(')))(input)?;
    let (input, params) = separated_list0(delimited(sc, char(','), sc), |i| {
        param_decl(i, original_input)
    })(input)?;
    let (input, _) = sc(input)?;
    let (input, _) = cut(context("closing parenthesis", char(')')))(input)?;

    let (input, return_ty) = opt(preceded(
        tuple((sc, tag("->"), sc)),
        cut(context("return type", type_expr)),
    ))(input)?;

    let (input, body) = cut(|i| block(i, original_input, 1))(input)?;

    let end_offset = original_input.len() - input.len();

    Ok((
        input,
        FunctionDef {
            name,
            params,
            return_ty: return_ty.unwrap_or(TypeTag::Any),
            body,
            span: Span::new(start_offset, end_offset),
        },
    ))
}

fn param_decl<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
) -> IResult<&'a str, ParamDecl, E> {
    let (input, _) = sc(input)?;
    let start_offset = original_input.len() - input.len();

    let (input, name) = identifier(input)?;
    let (input, ty) = opt(preceded(
        tuple((sc, char(':'), sc)),
        cut(context("parameter type", type_expr)),
    ))(input)?;
    let (input, default) = opt(preceded(
        tuple((sc, char('='), sc)),
        cut(context("default value", literal)),
    ))(input)?;

    let end_offset = original_input.len() - input.len();

    Ok((
        input,
        ParamDecl {
            name,
            ty: ty.unwrap_or(TypeTag::Any),
            default,
            span: Span::new(start_offset, end_offset),
        },
    ))
}

// ============================================================================
// Statements
// ============================================================================

fn block<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Vec<Stmt>, E> {
    check_depth(input, depth)?;
    let (input, _) = sc(input)?;
    let (input, _) = char('{')(input)?;
    let (input, stmts) = many0(|i| statement(i, original_input, depth))(input)?;
    let (input, _) = sc(input)?;
    let (input, _) = cut(context("closing brace", char('}')))(input)?;
    Ok((input, stmts))
}

fn statement<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Stmt, E> {
    let (input, _) = sc(input)?;
    alt((
        |i| let_stmt(i, original_input, depth),
        |i| if_stmt(i, original_input, depth),
        |i| while_stmt(i, original_input, depth),
        |i| return_stmt(i, original_input, depth),
        |i| assign_stmt(i, original_input, depth),
    ))(input)
}

fn let_stmt<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Stmt, E> {
    let start_offset = original_input.len() - input.len();
    let (input, _) = kw("let")(input)?;
    let (input, _) = sc(input)?;
    let (input, name) = cut(context("binding name", identifier))(input)?;
    let (input, _) = sc(input)?;
    let (input, _) = cut(context("'='", char('=')))(input)?;
    let (input, _) = sc(input)?;
    let (input, value) = cut(context("expression", |i| expr(i, original_input, depth)))(input)?;
    let (input, _) = sc(input)?;
    let (input, _) = cut(context("';'", char(';')))(input)?;
    let end_offset = original_input.len() - input.len();

    Ok((
        input,
        Stmt::Let {
            name,
            value,
            span: Span::new(start_offset, end_offset),
        },
    ))
}

fn assign_stmt<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Stmt, E> {
    let start_offset = original_input.len() - input.len();
    let (input, name) = identifier(input)?;
    let (input, _) = sc(input)?;
    // '=' but not '=='
    let (input, _) = terminated(char('='), not(char('=')))(input)?;
    let (input, _) = sc(input)?;
    let (input, value) = cut(context("expression", |i| expr(i, original_input, depth)))(input)?;
    let (input, _) = sc(input)?;
    let (input, _) = cut(context("';'", char(';')))(input)?;
    let end_offset = original_input.len() - input.len();

    Ok((
        input,
        Stmt::Assign {
            name,
            value,
            span: Span::new(start_offset, end_offset),
        },
    ))
}

fn if_stmt<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Stmt, E> {
    let start_offset = original_input.len() - input.len();
    let (input, _) = kw("if")(input)?;
    let (input, _) = sc(input)?;
    let (input, cond) = cut(context("condition", |i| expr(i, original_input, depth)))(input)?;
    let (input, then_body) = cut(|i| block(i, original_input, depth + 1))(input)?;
    let (input, else_body) = opt(preceded(
        pair(sc, kw("else")),
        cut(context("else branch", |i| else_tail(i, original_input, depth))),
    ))(input)?;
    let end_offset = original_input.len() - input.len();

    Ok((
        input,
        Stmt::If {
            cond,
            then_body,
            else_body,
            span: Span::new(start_offset, end_offset),
        },
    ))
}

/// After `else`: either a block or a chained `if` (desugared into a
/// single-statement body). Each chained `if` counts against the nesting
/// cap so long chains cannot recurse unboundedly.
fn else_tail<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Vec<Stmt>, E> {
    let (input, _) = sc(input)?;
    check_depth(input, depth + 1)?;
    alt((
        map(|i| if_stmt(i, original_input, depth + 1), |s| vec![s]),
        |i| block(i, original_input, depth + 1),
    ))(input)
}

fn while_stmt<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Stmt, E> {
    let start_offset = original_input.len() - input.len();
    let (input, _) = kw("while")(input)?;
    let (input, _) = sc(input)?;
    let (input, cond) = cut(context("condition", |i| expr(i, original_input, depth)))(input)?;
    let (input, body) = cut(|i| block(i, original_input, depth + 1))(input)?;
    let end_offset = original_input.len() - input.len();

    Ok((
        input,
        Stmt::While {
            cond,
            body,
            span: Span::new(start_offset, end_offset),
        },
    ))
}

fn return_stmt<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Stmt, E> {
    let start_offset = original_input.len() - input.len();
    let (input, _) = kw("return")(input)?;
    let (input, _) = sc(input)?;
    let (input, value) = cut(context("expression", |i| expr(i, original_input, depth)))(input)?;
    let (input, _) = sc(input)?;
    let (input, _) = cut(context("';'", char(';')))(input)?;
    let end_offset = original_input.len() - input.len();

    Ok((
        input,
        Stmt::Return {
            value,
            span: Span::new(start_offset, end_offset),
        },
    ))
}

// ============================================================================
// Expressions
// ============================================================================

/// Entry point; callers eat leading whitespace themselves
fn expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    or_expr(input, original_input, depth)
}

fn or_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    let (input, first) = and_expr(input, original_input, depth)?;
    let (input, rest) = many0(pair(
        preceded(sc, value(BinaryOp::Or, tag("||"))),
        preceded(sc, |i| and_expr(i, original_input, depth)),
    ))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn and_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    let (input, first) = cmp_expr(input, original_input, depth)?;
    let (input, rest) = many0(pair(
        preceded(sc, value(BinaryOp::And, tag("&&"))),
        preceded(sc, |i| cmp_expr(i, original_input, depth)),
    ))(input)?;
    Ok((input, fold_binary(first, rest)))
}

/// Single, non-associative comparison: `a < b < c` is a syntax error
fn cmp_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    let (input, lhs) = add_expr(input, original_input, depth)?;
    let (input, tail) = opt(pair(
        preceded(sc, cmp_op),
        preceded(sc, |i| add_expr(i, original_input, depth)),
    ))(input)?;
    match tail {
        Some((op, rhs)) => {
            let span = Span::merge(lhs.span(), rhs.span());
            Ok((
                input,
                Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    span,
                },
            ))
        }
        None => Ok((input, lhs)),
    }
}

fn cmp_op<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, BinaryOp, E> {
    alt((
        value(BinaryOp::Le, tag("<=")),
        value(BinaryOp::Ge, tag(">=")),
        value(BinaryOp::Eq, tag("==")),
        value(BinaryOp::Ne, tag("!=")),
        value(BinaryOp::Lt, tag("<")),
        value(BinaryOp::Gt, tag(">")),
    ))(input)
}

fn add_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    let (input, first) = mul_expr(input, original_input, depth)?;
    let (input, rest) = many0(pair(
        preceded(
            sc,
            alt((
                value(BinaryOp::Add, tag("+")),
                value(BinaryOp::Sub, tag("-")),
            )),
        ),
        preceded(sc, |i| mul_expr(i, original_input, depth)),
    ))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn mul_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    let (input, first) = unary_expr(input, original_input, depth)?;
    let (input, rest) = many0(pair(
        preceded(
            sc,
            alt((
                value(BinaryOp::Mul, tag("*")),
                value(BinaryOp::Div, tag("/")),
                value(BinaryOp::Mod, tag("%")),
            )),
        ),
        preceded(sc, |i| unary_expr(i, original_input, depth)),
    ))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn unary_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    let start_offset = original_input.len() - input.len();
    let (input, ops) = many0(terminated(
        alt((
            value(UnaryOp::Not, char('!')),
            value(UnaryOp::Neg, char('-')),
        )),
        sc,
    ))(input)?;
    let (input, base) = postfix_expr(input, original_input, depth)?;
    let end_offset = original_input.len() - input.len();

    let folded = ops.into_iter().rev().fold(base, |operand, op| Expr::Unary {
        op,
        operand: Box::new(operand),
        span: Span::new(start_offset, end_offset),
    });
    Ok((input, folded))
}

/// Subscript chains: `base[expr][expr]...`
fn postfix_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    let (mut input, mut base) = primary(input, original_input, depth)?;

    loop {
        let attempt: IResult<&'a str, Expr, E> = preceded(
            pair(sc, char('[')),
            terminated(
                preceded(sc, |i| expr(i, original_input, depth + 1)),
                pair(sc, cut(context("closing bracket", char(']')))),
            ),
        )(input);
        match attempt {
            Ok((rest, index)) => {
                let end_offset = original_input.len() - rest.len();
                let span = Span::new(base.span().start, end_offset);
                base = Expr::Index {
                    base: Box::new(base),
                    index: Box::new(index),
                    span,
                };
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((input, base))
}

fn primary<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    check_depth(input, depth)?;

    // Literals first so `true` and `false` never reach the identifier path
    alt((
        |i| literal_expr(i, original_input),
        |i| group_expr(i, original_input, depth),
        |i| ident_expr(i, original_input, depth),
    ))(input)
}

fn literal_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
) -> IResult<&'a str, Expr, E> {
    let start_offset = original_input.len() - input.len();
    let (input, lit) = alt((
        map(string_literal, Literal::Str),
        map(map_res(digit1, |s: &str| s.parse::<i64>()), Literal::Int),
        value(Literal::Bool(true), kw("true")),
        value(Literal::Bool(false), kw("false")),
    ))(input)?;
    let end_offset = original_input.len() - input.len();

    Ok((
        input,
        Expr::Literal {
            value: lit,
            span: Span::new(start_offset, end_offset),
        },
    ))
}

/// Parenthesized group; transparent in the tree
fn group_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    delimited(
        char('('),
        preceded(sc, |i| expr(i, original_input, depth + 1)),
        pair(sc, cut(context("closing parenthesis", char(')')))),
    )(input)
}

/// Variable reference or builtin call
fn ident_expr<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
    original_input: &'a str,
    depth: u32,
) -> IResult<&'a str, Expr, E> {
    let start_offset = original_input.len() - input.len();
    let (input, name) = identifier(input)?;
    let (input, args) = opt(preceded(
        pair(sc, char('(')),
        terminated(
            separated_list0(
                delimited(sc, char(','), sc),
                preceded(sc, |i| expr(i, original_input, depth + 1)),
            ),
            pair(sc, cut(context("closing parenthesis", char(')')))),
        ),
    ))(input)?;
    let end_offset = original_input.len() - input.len();
    let span = Span::new(start_offset, end_offset);

    Ok((
        input,
        match args {
            Some(args) => Expr::Call { name, args, span },
            None => Expr::Var { name, span },
        },
    ))
}

// ============================================================================
// Literals
// ============================================================================

// String literals with escape sequences. An immediate closing quote is the
// empty string; escaped_transform alone would reject it.
fn string_literal<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, String, E> {
    let (input, _) = char('"')(input)?;
    let (input, content) = opt(escaped_transform(
        none_of("\"\\"),
        '\\',
        alt((
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
            value('\\', char('\\')),
            value('"', char('"')),
        )),
    ))(input)?;
    let (input, _) = cut(context("closing quote", char('"')))(input)?;
    Ok((input, content.unwrap_or_default()))
}

/// Literal for parameter defaults; accepts a leading sign on integers
fn literal<'a, E: NomParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>>(
    input: &'a str,
) -> IResult<&'a str, Literal, E> {
    alt((
        map(string_literal, Literal::Str),
        map(
            map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
                s.parse::<i64>()
            }),
            Literal::Int,
        ),
        value(Literal::Bool(true), kw("true")),
        value(Literal::Bool(false), kw("false")),
    ))(input)
}

// ============================================================================
// Helpers
// ============================================================================

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |lhs, (op, rhs)| {
        let span = Span::merge(lhs.span(), rhs.span());
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        }
    })
}

fn check_depth<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
    depth: u32,
) -> Result<(), nom::Err<E>> {
    if depth > MAX_NESTING_DEPTH {
        Err(nom::Err::Failure(E::add_context(
            input,
            "nesting too deep",
            E::from_error_kind(input, nom::error::ErrorKind::TooLarge),
        )))
    } else {
        Ok(())
    }
}
