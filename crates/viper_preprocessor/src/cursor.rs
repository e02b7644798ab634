//! A token list that can be edited at a cursor

use std::collections::VecDeque;
use viper_tokens::Token;

/// A gap buffer of tokens.
///
/// Tokens before the cursor are finished and are never looked at again. The token at the cursor is
/// the current token. Removing the current token or inserting finished tokens at the cursor are
/// both constant time.
#[derive(Debug, Default, Clone)]
pub struct TokenCursor {
    done: Vec<Token>,
    pending: VecDeque<Token>,
}

impl TokenCursor {
    /// Creates a new cursor, positioned at the first token
    pub fn new<I: IntoIterator<Item = Token>>(tokens: I) -> Self {
        Self {
            done: vec![],
            pending: tokens.into_iter().collect(),
        }
    }

    /// The token at the cursor
    pub fn current(&self) -> Option<&Token> {
        self.pending.front()
    }

    /// The token after the cursor
    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(1)
    }

    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.pending.get(n)
    }

    /// Moves the cursor past the current token, keeping it
    pub fn advance(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(token) => {
                self.done.push(token);
                true
            }
            None => false,
        }
    }

    /// Removes the current token, the next token becomes current
    pub fn remove(&mut self) -> Option<Token> {
        self.pending.pop_front()
    }

    /// Removes tokens up to and including the next token matching `predicate`, returning them
    /// without the matching token.
    pub fn remove_until<F: Fn(&Token) -> bool>(&mut self, predicate: F) -> Vec<Token> {
        let mut removed = vec![];
        while let Some(token) = self.pending.pop_front() {
            if predicate(&token) {
                break;
            }
            removed.push(token);
        }
        removed
    }

    /// Inserts finished tokens at the cursor. They will not become current.
    pub fn insert_before<I: IntoIterator<Item = Token>>(&mut self, tokens: I) {
        self.done.extend(tokens);
    }

    pub fn is_at_end(&self) -> bool {
        self.pending.is_empty()
    }

    /// Gets every token, finished or not, in order
    pub fn into_tokens(self) -> Vec<Token> {
        let mut tokens = self.done;
        tokens.extend(self.pending);
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viper_tokens::TokenKind;

    fn tokens(kinds: &[TokenKind]) -> Vec<Token> {
        kinds.iter().cloned().map(Token::call_site).collect()
    }

    #[test]
    fn test_lookahead() {
        let cursor = TokenCursor::new(tokens(&[TokenKind::Let, TokenKind::SemiColon]));
        assert_eq!(cursor.current().map(Token::kind), Some(&TokenKind::Let));
        assert_eq!(cursor.peek().map(Token::kind), Some(&TokenKind::SemiColon));
        assert_eq!(cursor.peek_nth(2), None);
    }

    #[test]
    fn test_remove_and_insert() {
        let mut cursor = TokenCursor::new(tokens(&[
            TokenKind::Integer(1),
            TokenKind::Directive("include".to_string()),
            TokenKind::String("b".to_string()),
            TokenKind::Nl,
            TokenKind::Integer(3),
        ]));
        assert!(cursor.advance());
        assert!(cursor.remove().is_some());
        let line = cursor.remove_until(Token::is_newline);
        assert_eq!(line, tokens(&[TokenKind::String("b".to_string())]));
        cursor.insert_before(tokens(&[TokenKind::Integer(2)]));
        assert_eq!(cursor.current().map(Token::kind), Some(&TokenKind::Integer(3)));
        assert!(cursor.advance());
        assert!(cursor.is_at_end());
        assert!(!cursor.advance());
        assert_eq!(
            cursor.into_tokens(),
            tokens(&[
                TokenKind::Integer(1),
                TokenKind::Integer(2),
                TokenKind::Integer(3)
            ])
        );
    }
}
