use std::fmt::{Display, Formatter};
use viper_ast::ConstructionError;
use viper_tokens::{Span, Token};

/// Represents an error occurring during parsing
#[derive(Debug, thiserror::Error)]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub location: Option<Span>,
    pub non_terminal_stack: Vec<&'static str>,
}

impl SyntaxError {
    /// Creates a new error
    pub fn new(
        kind: ErrorKind,
        location: impl Into<Option<Span>>,
        non_terminals: Vec<&'static str>,
    ) -> Self {
        Self {
            kind,
            location: location.into(),
            non_terminal_stack: non_terminals,
        }
    }

    /// A short description of the error, used as the reason of the invalid node replacing the
    /// construct that failed
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "syntax error: {}", self.kind)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        if let Some(non_terminal) = self.non_terminal_stack.last() {
            write!(f, " (while parsing {non_terminal})")?;
        }
        Ok(())
    }
}

/// [SyntaxError] kind
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("illegal statement: {reason}")]
    IllegalStatement { reason: String },
    #[error("expected {}, got {}", .0.join(" or "), .1.as_ref().map(|t| format!("{t:?}")).unwrap_or_else(|| "EOF".to_string()))]
    ExpectedToken(Vec<String>, Option<Token>),
    #[error("unexpected token: {0:?}")]
    UnexpectedToken(Token),
    #[error("unexpected EOF")]
    UnexpectedEof,
    #[error("expression nested more than {0} levels deep")]
    NestedTooDeeply(usize),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

impl ErrorKind {
    pub fn illegal_statement(reason: impl AsRef<str>) -> Self {
        Self::IllegalStatement {
            reason: reason.as_ref().to_string(),
        }
    }

    pub fn expected_token(
        token_kinds: impl IntoIterator<Item = impl AsRef<str>>,
        found: impl Into<Option<Token>>,
    ) -> Self {
        Self::ExpectedToken(
            token_kinds
                .into_iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
            found.into(),
        )
    }
}

pub type SyntaxResult<T = ()> = std::result::Result<T, SyntaxError>;
