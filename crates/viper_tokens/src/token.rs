//! A lexical token from a source file, along with the sequence type the preprocessor hands on

use crate::spanned::{Span, Spanned};
use itertools::Itertools;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Deref, DerefMut};

/// A lexical token from a source file
#[derive(Clone)]
pub struct Token {
    span: Span,
    kind: TokenKind,
}

impl Token {
    /// Creates a new token
    pub fn new(span: Span, kind: TokenKind) -> Self {
        Self { span, kind }
    }

    /// Creates a token located at the caller, for tokens that have no source file
    #[track_caller]
    pub fn call_site(kind: TokenKind) -> Self {
        Self::new(Span::call_site(), kind)
    }

    /// Gets the kind for this token
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Takes the kind out of this token
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// Gets the name of a directive token (`#name`), if this is one
    pub fn directive_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Directive(name) => Some(name),
            _ => None,
        }
    }

    /// Gets the text of an identifier token, if this is one
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    #[inline]
    pub fn is_newline(&self) -> bool {
        matches!(self.kind, TokenKind::Nl)
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.kind, f)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.kind, f)
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Tokens compare by kind only, two tokens from different places are equal if they read the same
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind for this token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Proc,
    Let,
    Return,

    Identifier(String),

    // literals
    Float(f64),
    Integer(u64),
    String(String),
    Boolean(bool),

    /// `#name`, introduces a preprocessor directive
    Directive(String),

    /// new line
    Nl,
    SemiColon,
    /// :
    Colon,
    Comma,
    Dot,
    /// ->
    Arrow,

    LCurly,
    RCurly,
    LBracket,
    RBracket,
    LParen,
    RParen,

    /// =
    Assign,
    PlusAssign,
    MinusAssign,
    MultAssign,
    DivAssign,
    RemAssign,
    /// ==
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,

    Plus,
    Minus,
    Star,
    Div,
    Rem,
    LShift,
    RShift,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    And,
    Or,
    Bang,
    Tilde,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::Proc => "proc",
            TokenKind::Let => "let",
            TokenKind::Return => "return",
            TokenKind::Identifier(id) => return write!(f, "{id}"),
            TokenKind::Float(v) => return write!(f, "{v:?}"),
            TokenKind::Integer(v) => return write!(f, "{v}"),
            TokenKind::String(s) => return write!(f, "{s:?}"),
            TokenKind::Boolean(b) => return write!(f, "{b}"),
            TokenKind::Directive(name) => return write!(f, "#{name}"),
            TokenKind::Nl => "\n",
            TokenKind::SemiColon => ";",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::LCurly => "{",
            TokenKind::RCurly => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Assign => "=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::MultAssign => "*=",
            TokenKind::DivAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::Eq => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Lte => "<=",
            TokenKind::Gt => ">",
            TokenKind::Gte => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Div => "/",
            TokenKind::Rem => "%",
            TokenKind::LShift => "<<",
            TokenKind::RShift => ">>",
            TokenKind::BitwiseAnd => "&",
            TokenKind::BitwiseOr => "|",
            TokenKind::BitwiseXor => "^",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
        };
        f.write_str(text)
    }
}

/// An ordered sequence of tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream(Vec<Token>);

impl TokenStream {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the kinds of every token, in order
    pub fn kinds(&self) -> impl Iterator<Item = &TokenKind> {
        self.0.iter().map(Token::kind)
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.0
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(value: Vec<Token>) -> Self {
        Self(value)
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Deref for TokenStream {
    type Target = [Token];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for TokenStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Writes the tokens back out as source text, one space between tokens on the same line
impl Display for TokenStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = self
            .0
            .split(|token| token.is_newline())
            .map(|line| line.iter().join(" "))
            .join("\n");
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_token_stream() {
        let vec: Vec<Token> = vec![];
        let stream = TokenStream::from_iter(vec);
        assert!(stream.is_empty())
    }

    #[test]
    fn test_tokens_compare_by_kind() {
        let a = Token::call_site(TokenKind::Identifier("x".to_string()));
        let b = Token::call_site(TokenKind::Identifier("x".to_string()));
        assert_eq!(a, b);
        assert_ne!(a, Token::call_site(TokenKind::Let));
    }

    #[test]
    fn test_display_stream() {
        let stream = TokenStream::from_iter([
            Token::call_site(TokenKind::Let),
            Token::call_site(TokenKind::Identifier("x".to_string())),
            Token::call_site(TokenKind::Assign),
            Token::call_site(TokenKind::Integer(0)),
            Token::call_site(TokenKind::SemiColon),
            Token::call_site(TokenKind::Nl),
            Token::call_site(TokenKind::Directive("include".to_string())),
            Token::call_site(TokenKind::String("b".to_string())),
        ]);
        assert_eq!(stream.to_string(), "let x = 0 ;\n#include \"b\"");
    }
}
