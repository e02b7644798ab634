//! Responsible with converting source text into a token stream

use crate::lexer::token_parsing::{map_error, parse_insignificant, parse_token};
use nom::error::VerboseError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;
use viper_tokens::{Span, Token};

mod token_parsing;

/// Responsible with converting source text into a token stream.
///
/// Tokens carry their byte offset along with a 1-based line and column.
#[derive(Debug)]
pub struct Lexer<'a> {
    file: Arc<Path>,
    src: &'a str,
    offset: usize,
    line: usize,
    col: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over `src`, which was read from `path`
    pub fn new(path: &Path, src: &'a str) -> Self {
        Self {
            file: Arc::from(path),
            src,
            offset: 0,
            line: 1,
            col: 1,
            finished: false,
        }
    }

    /// Moves past `text`, which must be the text at the current offset
    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.offset += text.len();
    }

    fn error(&self, error: VerboseError<&str>) -> LexingError {
        let rest = &self.src[self.offset..];
        let found = rest
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .chars()
            .take(16)
            .collect();
        LexingError::Unrecognized {
            file: self.file.to_path_buf(),
            line: self.line,
            col: self.col,
            found,
            cause: map_error(error),
        }
    }

    fn next_token(&mut self) -> LexResult<Option<Token>> {
        let src = self.src;
        let insignificant = match parse_insignificant(&src[self.offset..]) {
            Ok((_, len)) => len,
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => return Err(self.error(e)),
            Err(nom::Err::Incomplete(_)) => return Err(LexingError::UnexpectedEof),
        };
        self.advance(&src[self.offset..][..insignificant]);

        let rest = &src[self.offset..];
        if rest.is_empty() {
            return Ok(None);
        }
        match parse_token(rest) {
            Ok((_, (len, kind))) => {
                let span = Span::from_shared(
                    self.file.clone(),
                    self.offset,
                    len,
                    self.line,
                    self.col,
                );
                self.advance(&rest[..len]);
                Ok(Some(Token::new(span, kind)))
            }
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(self.error(e)),
            Err(nom::Err::Incomplete(_)) => Err(LexingError::UnexpectedEof),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Tokenizes source text that was read from `path`
pub fn tokenize(path: &Path, src: &str) -> Result<Vec<Token>, LexingError> {
    let tokens = Lexer::new(path, src).collect::<Result<Vec<_>, _>>()?;
    trace!("tokenized {path:?} into {} tokens", tokens.len());
    Ok(tokens)
}

/// Reads and tokenizes a file
pub fn tokenize_file(path: &Path) -> Result<Vec<Token>, LexingError> {
    let src = std::fs::read_to_string(path)?;
    tokenize(path, &src)
}

type LexResult<T> = Result<T, LexingError>;

#[derive(Debug, Error)]
pub enum LexingError {
    #[error("{}:{line}:{col}: unrecognized input {found:?}", .file.display())]
    Unrecognized {
        file: PathBuf,
        line: usize,
        col: usize,
        found: String,
        cause: VerboseError<String>,
    },
    #[error("unexpected EOF")]
    UnexpectedEof,
    #[error(transparent)]
    IoError(#[from] io::Error),
}
