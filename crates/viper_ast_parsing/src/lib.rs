#![doc = include_str!("../README.md")]

use crate::lexer::{tokenize, LexingError};
use crate::parser::{ParseOutput, Parser};
use std::path::Path;
use viper_tokens::Token;

pub mod lexer;
pub mod parser;

/// Parses a preprocessed token stream into an ast.
pub fn parse<I: IntoIterator<Item = Token>>(tokens: I) -> ParseOutput {
    Parser::new(tokens).parse()
}

/// Tokenizes and parses source text directly, performing no preprocessing.
///
/// Directives left in the source are not understood by the parser and become invalid nodes.
pub fn parse_source(path: &Path, src: &str) -> Result<ParseOutput, LexingError> {
    Ok(parse(tokenize(path, src)?))
}
