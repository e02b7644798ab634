use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_till, take_until, take_while1, take_while_m_n};
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, hex_digit1, multispace1};
use nom::combinator::{
    all_consuming, consumed, cut, map, map_opt, map_parser, map_res, peek, recognize, value,
    verify,
};
use nom::error::{context, ErrorKind, FromExternalError, VerboseError};
use nom::multi::{fold_many0, many0, many0_count, many1};
use nom::number::complete::recognize_float;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{IResult, Parser};
use viper_tokens::TokenKind;

pub(crate) type Result<'a, O, E = &'a str> = IResult<&'a str, O, VerboseError<E>>;

/// Parses one token from the start of `src`, returning its length in bytes
pub fn parse_token(src: &str) -> Result<(usize, TokenKind)> {
    context(
        "token",
        map(consumed(_parse_token), |(consumed, token)| {
            (consumed.len(), token)
        }),
    )(src)
}

/// Parses everything that isn't a token, returning its length in bytes. Newlines are tokens, and
/// are not insignificant.
pub fn parse_insignificant(src: &str) -> Result<usize> {
    context(
        "insignificant",
        map(
            recognize(many0(alt((
                context("whitespace", take_while1(|c: char| c == ' ' || c == '\t' || c == '\r')),
                context(
                    "block comment",
                    recognize(preceded(
                        tag("/*"),
                        cut(terminated(take_until("*/"), tag("*/"))),
                    )),
                ),
                context(
                    "line comment",
                    recognize(preceded(tag("//"), take_till(|c: char| c == '\n'))),
                ),
            )))),
            |insignificant: &str| insignificant.len(),
        ),
    )(src)
}

pub(crate) fn map_error(e: VerboseError<&str>) -> VerboseError<String> {
    let VerboseError { errors } = e;
    let errors = errors
        .into_iter()
        .map(|(bytes, kind)| (bytes.to_string(), kind))
        .collect();
    VerboseError { errors }
}

fn _parse_token(src: &str) -> Result<TokenKind> {
    alt((
        parse_directive,
        parse_word,
        parse_literal,
        parse_punctuation,
        parse_operator,
        parse_newline,
    ))(src)
}

fn recognize_identifier(input: &str) -> Result<&str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn parse_directive(src: &str) -> Result<TokenKind> {
    context(
        "directive",
        map(preceded(char('#'), cut(recognize_identifier)), |name: &str| {
            TokenKind::Directive(name.to_string())
        }),
    )(src)
}

fn parse_operator(src: &str) -> Result<TokenKind> {
    context(
        "operator",
        alt((
            value(TokenKind::Eq, tag("==")),
            value(TokenKind::Neq, tag("!=")),
            value(TokenKind::Bang, char('!')),
            value(TokenKind::Assign, char('=')),
            value(TokenKind::Colon, char(':')),
            value(TokenKind::PlusAssign, tag("+=")),
            value(TokenKind::Plus, char('+')),
            value(TokenKind::Arrow, tag("->")),
            value(TokenKind::MinusAssign, tag("-=")),
            value(TokenKind::Minus, char('-')),
            value(TokenKind::DivAssign, tag("/=")),
            alt((
                value(TokenKind::Div, char('/')),
                value(TokenKind::RemAssign, tag("%=")),
                value(TokenKind::Rem, char('%')),
                value(TokenKind::MultAssign, tag("*=")),
                value(TokenKind::Star, char('*')),
                value(TokenKind::LBracket, char('[')),
                value(TokenKind::RBracket, char(']')),
                value(TokenKind::LParen, char('(')),
                value(TokenKind::RParen, char(')')),
                value(TokenKind::Dot, char('.')),
                value(TokenKind::Tilde, char('~')),
                alt((
                    value(TokenKind::And, tag("&&")),
                    value(TokenKind::BitwiseAnd, char('&')),
                    value(TokenKind::Or, tag("||")),
                    value(TokenKind::BitwiseOr, char('|')),
                    value(TokenKind::BitwiseXor, char('^')),
                    value(TokenKind::LShift, tag("<<")),
                    value(TokenKind::RShift, tag(">>")),
                    value(TokenKind::Lte, tag("<=")),
                    value(TokenKind::Lt, char('<')),
                    value(TokenKind::Gte, tag(">=")),
                    value(TokenKind::Gt, char('>')),
                )),
            )),
        )),
    )(src)
}

fn parse_word(src: &str) -> Result<TokenKind> {
    context(
        "word",
        preceded(
            peek(alt((alpha1, tag("_")))),
            cut(map_parser(recognize_identifier, |p| {
                alt((parse_keyword, parse_identifier))(p)
            })),
        ),
    )(src)
}

fn all_consuming_tag(src: &str) -> impl FnMut(&str) -> Result<&str> + '_ {
    move |i| all_consuming(tag(src))(i)
}

fn parse_keyword(src: &str) -> Result<TokenKind> {
    context(
        "keyword",
        alt((
            value(TokenKind::Proc, all_consuming_tag("proc")),
            value(TokenKind::Let, all_consuming_tag("let")),
            value(TokenKind::Return, all_consuming_tag("return")),
            value(TokenKind::Boolean(true), all_consuming_tag("true")),
            value(TokenKind::Boolean(false), all_consuming_tag("false")),
        )),
    )(src)
}

fn parse_identifier(src: &str) -> Result<TokenKind> {
    context(
        "identifier",
        map(recognize_identifier, |id: &str| {
            TokenKind::Identifier(id.to_string())
        }),
    )(src)
}

fn parse_newline(src: &str) -> Result<TokenKind> {
    context("newline", value(TokenKind::Nl, char('\n')))(src)
}

fn parse_punctuation(src: &str) -> Result<TokenKind> {
    context(
        "punctuation",
        alt((
            value(TokenKind::SemiColon, char(';')),
            value(TokenKind::LCurly, char('{')),
            value(TokenKind::RCurly, char('}')),
            value(TokenKind::Comma, char(',')),
        )),
    )(src)
}

fn parse_literal(src: &str) -> Result<TokenKind> {
    context(
        "literal",
        alt((
            map(parse_hexadecimal_value, TokenKind::Integer),
            map(parse_floating_point_value, TokenKind::Float),
            map(parse_integer_value, TokenKind::Integer),
            map(parse_string_value, TokenKind::String),
        )),
    )(src)
}

fn parse_hexadecimal_value(input: &str) -> Result<u64> {
    map_res(
        preceded(
            alt((tag("0x"), tag("0X"))),
            cut(recognize(many1(terminated(hex_digit1, many0(char('_')))))),
        ),
        |out: &str| {
            u64::from_str_radix(&out.replace('_', ""), 16)
                .map_err(|e| VerboseError::from_external_error(input, ErrorKind::Verify, e))
        },
    )(input)
}

fn parse_integer_value(input: &str) -> Result<u64> {
    map_res(
        recognize(many1(terminated(digit1, many0(char('_'))))),
        |out: &str| {
            u64::from_str(&out.replace('_', ""))
                .map_err(|e| VerboseError::from_external_error(input, ErrorKind::Verify, e))
        },
    )(input)
}

/// Only numbers with a fraction or an exponent are floats. Signs are operators.
fn parse_floating_point_value(input: &str) -> Result<f64> {
    map_res(
        verify(recognize_float, |s: &str| {
            s.starts_with(|c: char| c.is_ascii_digit() || c == '.')
                && s.contains(|c| matches!(c, '.' | 'e' | 'E'))
        }),
        |s: &str| {
            f64::from_str(s)
                .map_err(|e| VerboseError::from_external_error(input, ErrorKind::Verify, e))
        },
    )(input)
}

#[derive(Debug, Clone)]
enum StringFragment<'a> {
    Literal(&'a str),
    EscapedChar(char),
    EscapedWs,
}

fn parse_literal_str(input: &str) -> Result<&str> {
    verify(is_not("\"\\\n"), |s: &str| !s.is_empty())(input)
}

/// `\u{XXXX}`, with one to six hex digits
fn parse_unicode(input: &str) -> Result<char> {
    let parse_hex = take_while_m_n::<_, &str, VerboseError<&str>>(1, 6, |c: char| c.is_ascii_hexdigit());
    let parse_delimited_hex = preceded(char('u'), delimited(char('{'), parse_hex, char('}')));
    let parse_u32 = map_res(parse_delimited_hex, move |hex| u32::from_str_radix(hex, 16));
    map_opt(parse_u32, std::char::from_u32).parse(input)
}

fn parse_escaped_char(input: &str) -> Result<char> {
    preceded(
        char('\\'),
        alt((
            parse_unicode,
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
            value('\0', char('0')),
            value('\\', char('\\')),
            value('/', char('/')),
            value('"', char('"')),
        )),
    )
    .parse(input)
}

fn parse_escaped_whitespace(input: &str) -> Result<&str> {
    preceded(char('\\'), multispace1)(input)
}

fn parse_string_fragment(input: &str) -> Result<StringFragment> {
    alt((
        map(parse_literal_str, StringFragment::Literal),
        map(parse_escaped_char, StringFragment::EscapedChar),
        value(StringFragment::EscapedWs, parse_escaped_whitespace),
    ))(input)
}

fn parse_string_value(input: &str) -> Result<String> {
    let build_string = fold_many0(
        parse_string_fragment,
        String::new,
        |mut accum, next| {
            match next {
                StringFragment::Literal(l) => accum.push_str(l),
                StringFragment::EscapedChar(c) => accum.push(c),
                StringFragment::EscapedWs => {}
            }
            accum
        },
    );

    context(
        "string",
        delimited(char('"'), cut(build_string), cut(char('"'))),
    )(input)
}
