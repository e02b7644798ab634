//! Builds an [`Ast`] from a preprocessed token stream

use std::collections::VecDeque;
use tracing::{debug, trace};
use viper_ast::mangle::{lookup_name, mangle};
use viper_ast::precedence::is_prefix_operator;
use viper_ast::{
    Associativity, Ast, Checkpoint, Context, NodeId, NodeKind, Precedence, ScopeId, TypeRef,
};
use viper_tokens::{Spanned, Token, TokenKind};

mod error;

pub use error::*;

/// How deeply expressions may nest, counting parentheses, prefix operators and right-associative
/// chains
pub const MAX_EXPRESSION_DEPTH: usize = 128;

/// The tree built by a [`Parser`], along with every error it recovered from
#[derive(Debug, Default)]
pub struct ParseOutput {
    pub ast: Ast,
    pub errors: Vec<SyntaxError>,
}

impl ParseOutput {
    /// Checks if the tree was built without any errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A recursive descent parser using precedence climbing for expressions.
///
/// Newlines are insignificant to the parser and are dropped up front.
#[derive(Debug)]
pub struct Parser {
    tokens: VecDeque<Token>,
    last: Option<Token>,
    ast: Ast,
    module: Option<String>,
    scopes: Vec<ScopeId>,
    non_terminals: Vec<&'static str>,
    errors: Vec<SyntaxError>,
    depth: usize,
}

impl Parser {
    /// Creates a new parser over a token stream
    pub fn new<I: IntoIterator<Item = Token>>(tokens: I) -> Self {
        let mut ast = Ast::new();
        let global = ast.new_scope(None);
        Self {
            tokens: tokens.into_iter().filter(|t| !t.is_newline()).collect(),
            last: None,
            ast,
            module: None,
            scopes: vec![global],
            non_terminals: vec![],
            errors: vec![],
            depth: 0,
        }
    }

    /// Sets the module every parsed declaration belongs to
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Parses every item in the token stream
    pub fn parse(mut self) -> ParseOutput {
        while !self.is_at_end() {
            let checkpoint = self.ast.checkpoint();
            let item = if self.check(&TokenKind::Proc) {
                self.parse_procedure()
            } else {
                self.parse_statement()
            };
            let item = match item {
                Ok(item) => item,
                Err(error) => {
                    self.scopes.truncate(1);
                    match self.recover(checkpoint, error, true) {
                        Ok(invalid) => invalid,
                        Err(error) => {
                            self.errors.push(error);
                            continue;
                        }
                    }
                }
            };
            if let Err(error) = self.ast.push_root(item) {
                let error = self.error(error.into());
                self.errors.push(error);
            }
        }
        debug!(
            "parsed {} nodes with {} errors",
            self.ast.len(),
            self.errors.len()
        );
        ParseOutput {
            ast: self.ast,
            errors: self.errors,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    fn is_at_end(&self) -> bool {
        self.tokens.is_empty()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind() == kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.pop_front()?;
        trace!("consumed {token:?}");
        self.last = Some(token.clone());
        Some(token)
    }

    fn consume_if(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check(kind) {
            self.advance()
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> SyntaxResult<Token> {
        match self.consume_if(&kind) {
            Some(token) => Ok(token),
            None => Err(self.error(ErrorKind::expected_token(
                [format!("{kind:?}")],
                self.peek().cloned(),
            ))),
        }
    }

    fn expect_identifier(&mut self) -> SyntaxResult<(String, Token)> {
        let name = self.peek().and_then(Token::identifier).map(str::to_string);
        match name {
            Some(name) => {
                let token = self.advance().ok_or_else(|| self.error(ErrorKind::UnexpectedEof))?;
                Ok((name, token))
            }
            None => Err(self.error(ErrorKind::expected_token(
                ["identifier"],
                self.peek().cloned(),
            ))),
        }
    }

    /// The token an error at the current position points at
    fn current_or_last(&self) -> Option<Token> {
        self.peek().or(self.last.as_ref()).cloned()
    }

    fn error(&self, kind: ErrorKind) -> SyntaxError {
        let location = self.current_or_last().map(|t| t.span());
        SyntaxError::new(kind, location, self.non_terminals.clone())
    }

    fn scope(&self) -> Option<ScopeId> {
        self.scopes.last().copied()
    }

    fn add_node(&mut self, token: Token, kind: NodeKind) -> SyntaxResult<NodeId> {
        let context = Context::new(self.module.clone());
        let scope = self.scope();
        self.ast
            .add_with(token, kind, context, scope)
            .map_err(|e| self.error(e.into()))
    }

    fn non_terminal<T>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Self) -> SyntaxResult<T>,
    ) -> SyntaxResult<T> {
        self.non_terminals.push(name);
        let result = f(self);
        self.non_terminals.pop();
        result
    }

    /// Records `error`, drops every node built since `checkpoint` and replaces them with a single
    /// invalid node. Skips forward to the end of the failed statement.
    fn recover(
        &mut self,
        checkpoint: Checkpoint,
        error: SyntaxError,
        top_level: bool,
    ) -> SyntaxResult<NodeId> {
        debug!("recovering from {error}");
        self.ast.rollback(checkpoint);
        let token = self
            .current_or_last()
            .unwrap_or_else(|| Token::call_site(TokenKind::SemiColon));
        let reason = error.reason();
        self.errors.push(error);
        self.synchronize(top_level);
        self.add_node(token, NodeKind::Invalid { reason })
    }

    /// Skips to just past the next `;`. A `}` also ends the skip, and is only consumed outside of a
    /// procedure body.
    fn synchronize(&mut self, top_level: bool) {
        while let Some(token) = self.peek() {
            match token.kind() {
                TokenKind::SemiColon => {
                    self.advance();
                    return;
                }
                TokenKind::RCurly => {
                    if top_level {
                        self.advance();
                    }
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_procedure(&mut self) -> SyntaxResult<NodeId> {
        self.non_terminal("procedure", |parser| {
            let keyword = parser.expect(TokenKind::Proc)?;
            let (name, _) = parser.expect_identifier()?;
            let module = parser.module.clone();
            let enclosing = parser.scope();
            let scope = parser.ast.new_scope(enclosing);
            parser.scopes.push(scope);

            parser.expect(TokenKind::LParen)?;
            let mut params = vec![];
            while !parser.check(&TokenKind::RParen) {
                params.push(parser.parse_parameter()?);
                if parser.consume_if(&TokenKind::Comma).is_none() {
                    break;
                }
            }
            parser.expect(TokenKind::RParen)?;

            let return_type = if parser.consume_if(&TokenKind::Arrow).is_some() {
                let (_, token) = parser.expect_identifier()?;
                TypeRef::new(token)
            } else {
                TypeRef::named("void")
            };

            parser.expect(TokenKind::LCurly)?;
            let mut body = vec![];
            while !parser.check(&TokenKind::RCurly) {
                if parser.is_at_end() {
                    return Err(parser.error(ErrorKind::UnexpectedEof));
                }
                let checkpoint = parser.ast.checkpoint();
                let statement = match parser.parse_statement() {
                    Ok(statement) => statement,
                    Err(error) => parser.recover(checkpoint, error, false)?,
                };
                body.push(statement);
            }
            parser.expect(TokenKind::RCurly)?;
            parser.scopes.pop();

            trace!("parsed procedure {name} with {} statements", body.len());
            parser.add_node(
                keyword,
                NodeKind::Procedure {
                    mangled_name: mangle(module.as_deref(), &name),
                    lookup_name: lookup_name(module.as_deref(), &name),
                    name,
                    params,
                    return_type,
                    body,
                },
            )
        })
    }

    fn parse_parameter(&mut self) -> SyntaxResult<NodeId> {
        self.non_terminal("parameter", |parser| {
            let (name, token) = parser.expect_identifier()?;
            parser.expect(TokenKind::Colon)?;
            let (_, data_type) = parser.expect_identifier()?;
            parser.add_node(token, NodeKind::Parameter { name, data_type })
        })
    }

    fn parse_statement(&mut self) -> SyntaxResult<NodeId> {
        self.non_terminal("statement", |parser| {
            let token = parser
                .peek()
                .cloned()
                .ok_or_else(|| parser.error(ErrorKind::UnexpectedEof))?;
            match token.kind() {
                TokenKind::Let => parser.parse_variable_declaration(),
                TokenKind::SemiColon => {
                    parser.advance();
                    parser.add_node(token, NodeKind::Noop)
                }
                TokenKind::Return => {
                    parser.advance();
                    if parser.consume_if(&TokenKind::SemiColon).is_some() {
                        return parser.add_node(token, NodeKind::Noop);
                    }
                    let expr = parser.parse_expression(Precedence::Lowest)?;
                    parser.expect(TokenKind::SemiColon)?;
                    parser.add_node(token, NodeKind::ExpressionStatement { expr })
                }
                _ => {
                    let expr = parser.parse_expression(Precedence::Lowest)?;
                    parser.expect(TokenKind::SemiColon)?;
                    parser.add_node(token, NodeKind::ExpressionStatement { expr })
                }
            }
        })
    }

    fn parse_variable_declaration(&mut self) -> SyntaxResult<NodeId> {
        self.non_terminal("variable declaration", |parser| {
            let token = parser.expect(TokenKind::Let)?;
            let (name, _) = parser.expect_identifier()?;
            parser.expect(TokenKind::Colon)?;
            let (_, type_token) = parser.expect_identifier()?;
            parser.expect(TokenKind::Assign)?;
            let value = parser.parse_expression(Precedence::Lowest)?;
            parser.expect(TokenKind::SemiColon)?;
            let mangled_name = mangle(parser.module.as_deref(), &name);
            parser.add_node(
                token,
                NodeKind::VariableDeclaration {
                    name,
                    mangled_name,
                    type_spec: TypeRef::new(type_token),
                    value,
                },
            )
        })
    }

    /// Parses an expression made of operators binding at least as tightly as `min`
    fn parse_expression(&mut self, min: Precedence) -> SyntaxResult<NodeId> {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            return Err(self.error(ErrorKind::NestedTooDeeply(MAX_EXPRESSION_DEPTH)));
        }
        self.depth += 1;
        let expression = self.parse_expression_unchecked(min);
        self.depth -= 1;
        expression
    }

    fn parse_expression_unchecked(&mut self, min: Precedence) -> SyntaxResult<NodeId> {
        self.non_terminal("expression", |parser| {
            let mut lhs = parser.parse_prefix()?;
            while let Some(op) = parser.peek().cloned() {
                let precedence = Precedence::of(op.kind());
                if !precedence.is_operator() || precedence < min {
                    break;
                }
                parser.advance();
                let next_min = match Associativity::of(op.kind()) {
                    Associativity::Left => precedence.next(),
                    Associativity::Right => precedence,
                };
                let rhs = parser.parse_expression(next_min)?;
                lhs = parser.add_node(op.clone(), NodeKind::Binary { lhs, op, rhs })?;
            }
            Ok(lhs)
        })
    }

    fn parse_prefix(&mut self) -> SyntaxResult<NodeId> {
        match self.peek() {
            Some(token) if is_prefix_operator(token.kind()) => {
                let op = self.advance().ok_or_else(|| self.error(ErrorKind::UnexpectedEof))?;
                let rhs = self.parse_expression(Precedence::Prefix)?;
                self.add_node(op.clone(), NodeKind::Prefix { op, rhs })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> SyntaxResult<NodeId> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error(ErrorKind::UnexpectedEof));
        };
        if let Some(literal) = NodeKind::literal(token.kind()) {
            self.advance();
            return self.add_node(token, literal);
        }
        match token.kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                self.add_node(token, NodeKind::Identifier(name))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(self.error(ErrorKind::UnexpectedToken(token))),
        }
    }
}
