//! The preprocessor proper

use crate::cursor::TokenCursor;
use crate::directive::Directive;
use crate::graph::{DependencyGraph, GraphCyclic};
use crate::macros::{Macro, MacroKind, MacroTable};
use crate::resolver::ModuleResolver;
use std::collections::{HashMap, VecDeque};
use std::iter::Peekable;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument, trace, warn};
use viper_diagnostics::{Diagnostic, Diagnostics, ErrorLevel};
use viper_files::{Module, SourceUnits, UnitId};
use viper_tokens::{Spanned, Token, TokenKind, TokenStream};
use viper_types::PrimitiveType;

/// State shared by every preprocessor run of a session.
///
/// Every run shares one macro table and one dependency graph. Whether an include is cyclic only
/// depends on the units the run is in the middle of, so preprocessing a unit gives the same tokens
/// no matter what else was preprocessed before it.
#[derive(Debug)]
pub struct PreprocessContext<R: ModuleResolver> {
    units: SourceUnits,
    macros: MacroTable,
    graph: DependencyGraph,
    resolver: R,
}

impl<R: ModuleResolver> PreprocessContext<R> {
    /// Creates a new, empty context
    pub fn new(resolver: R) -> Self {
        Self::with_units(resolver, SourceUnits::new())
    }

    /// Creates a context over units that have already been loaded
    pub fn with_units(resolver: R, units: SourceUnits) -> Self {
        Self {
            units,
            macros: MacroTable::new(),
            graph: DependencyGraph::new(),
            resolver,
        }
    }

    pub fn units(&self) -> &SourceUnits {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut SourceUnits {
        &mut self.units
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn macros_mut(&mut self) -> &mut MacroTable {
        &mut self.macros
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Takes the loaded units out of this context
    pub fn into_units(self) -> SourceUnits {
        self.units
    }

    /// Loads a file, then preprocesses it
    pub fn preprocess_file(&mut self, path: impl AsRef<Path>) -> (Option<UnitId>, PreprocessOutput) {
        match self.units.load(path) {
            Ok(unit) => (Some(unit), self.preprocess(unit)),
            Err(error) => (
                None,
                PreprocessOutput {
                    tokens: TokenStream::new(),
                    diagnostics: Diagnostics::from_iter([error]),
                },
            ),
        }
    }

    /// Tokenizes and preprocesses a unit that is part of this context
    pub fn preprocess(&mut self, unit: UnitId) -> PreprocessOutput {
        match self.tokenize(unit) {
            Ok(tokens) => Preprocessor::new(self, unit, tokens).process(),
            Err(error) => PreprocessOutput {
                tokens: TokenStream::new(),
                diagnostics: Diagnostics::from_iter([error]),
            },
        }
    }

    fn tokenize(&self, unit: UnitId) -> Result<Vec<Token>, Diagnostic> {
        let source = self.units.get(unit).ok_or_else(|| {
            Diagnostic::new(
                format!("no source unit {unit} in this session"),
                ErrorLevel::Fatal,
            )
        })?;
        self.resolver.tokenize(source)
    }
}

/// The result of preprocessing a token stream
#[derive(Debug, Default, Clone)]
pub struct PreprocessOutput {
    /// The resolved tokens. Never contains a directive.
    pub tokens: TokenStream,
    pub diagnostics: Diagnostics,
}

impl PreprocessOutput {
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.has_fatal()
    }
}

/// A unit whose directives are being resolved
#[derive(Debug)]
struct Frame {
    unit: UnitId,
    cursor: TokenCursor,
    diagnostics: Diagnostics,
    include: Option<PendingInclude>,
}

/// An include waiting on the tokens of the units it resolved to
#[derive(Debug)]
struct PendingInclude {
    name: String,
    waiting: VecDeque<UnitId>,
    spliced: Vec<Token>,
}

impl Frame {
    fn new(unit: UnitId, tokens: Vec<Token>) -> Self {
        Self {
            unit,
            cursor: TokenCursor::new(tokens),
            diagnostics: Diagnostics::new(),
            include: None,
        }
    }

    /// Hands over the preprocessed tokens of an included unit
    fn receive(&mut self, tokens: Vec<Token>) {
        if let Some(include) = &mut self.include {
            include.spliced.extend(tokens);
        }
    }

    fn into_output(self) -> PreprocessOutput {
        PreprocessOutput {
            tokens: self.cursor.into_tokens().into(),
            diagnostics: self.diagnostics,
        }
    }
}

/// Resolves the directives in the token stream of one unit.
///
/// Included units are preprocessed on an explicit stack of suspended units rather than by
/// recursion, so the include depth is only limited by memory. Within one run a unit is only
/// preprocessed once, later includes of it reuse its tokens.
pub struct Preprocessor<'c, R: ModuleResolver> {
    ctx: &'c mut PreprocessContext<R>,
    current: Frame,
    suspended: Vec<Frame>,
    processed: HashMap<UnitId, Vec<Token>>,
}

impl<'c, R: ModuleResolver> Preprocessor<'c, R> {
    /// Creates a preprocessor over `tokens`, which belong to `unit`
    pub fn new<I: IntoIterator<Item = Token>>(
        ctx: &'c mut PreprocessContext<R>,
        unit: UnitId,
        tokens: I,
    ) -> Self {
        ctx.graph.add_unit(unit);
        Self {
            ctx,
            current: Frame::new(unit, tokens.into_iter().collect()),
            suspended: vec![],
            processed: HashMap::new(),
        }
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current.cursor.current()
    }

    pub fn peek_token(&self) -> Option<&Token> {
        self.current.cursor.peek()
    }

    /// Runs the preprocessor to completion
    #[instrument(skip_all, fields(unit = %self.current.unit))]
    pub fn process(mut self) -> PreprocessOutput {
        debug!("preprocessing");
        loop {
            if let Some(dependency) = self.scan() {
                self.enter(dependency);
                continue;
            }
            let Some(parent) = self.suspended.pop() else {
                return self.current.into_output();
            };
            let finished = std::mem::replace(&mut self.current, parent);
            let unit = finished.unit;
            let output = finished.into_output();
            let tokens = output.tokens.into_vec();
            self.processed.insert(unit, tokens.clone());
            self.current.diagnostics.extend(output.diagnostics);
            self.current.receive(tokens);
        }
    }

    /// Scans the current unit until it needs the tokens of another unit or runs out of tokens
    fn scan(&mut self) -> Option<UnitId> {
        loop {
            if let Some(include) = &mut self.current.include {
                if let Some(next) = include.waiting.pop_front() {
                    return Some(next);
                }
            }
            if let Some(include) = self.current.include.take() {
                trace!(
                    "splicing {} tokens from {:?}",
                    include.spliced.len(),
                    include.name
                );
                self.current.cursor.insert_before(include.spliced);
            }

            let token = self.current.cursor.current()?;
            let Some(directive) = token.directive_name().map(Directive::classify) else {
                self.current.cursor.advance();
                continue;
            };
            let token = self.current.cursor.remove()?;
            self.dispatch(directive, token);
        }
    }

    /// Suspends the current unit and starts on `unit`, unless its tokens are already known
    fn enter(&mut self, unit: UnitId) {
        if let Some(tokens) = self.processed.get(&unit).cloned() {
            trace!("unit {unit} was already preprocessed");
            self.current.receive(tokens);
            return;
        }
        match self.ctx.tokenize(unit) {
            Ok(tokens) => {
                self.ctx.graph.add_unit(unit);
                let parent = std::mem::replace(&mut self.current, Frame::new(unit, tokens));
                self.suspended.push(parent);
                debug!(depth = self.suspended.len(), "preprocessing included unit {unit}");
            }
            Err(error) => self.report(error),
        }
    }

    /// The cycle that including `dependency` from the current unit would close, if `dependency` is
    /// still being preprocessed. The cycle starts and ends with the current unit.
    fn cycle_through(&self, dependency: UnitId) -> Option<Vec<UnitId>> {
        let in_progress = self
            .suspended
            .iter()
            .map(|frame| frame.unit)
            .chain([self.current.unit]);
        let start = in_progress.clone().position(|unit| unit == dependency)?;
        Some(
            std::iter::once(self.current.unit)
                .chain(in_progress.skip(start))
                .collect(),
        )
    }

    fn dispatch(&mut self, directive: Directive, token: Token) {
        trace!("found {directive:?} at {}", token.span());
        match directive {
            Directive::Include => {
                let line = self.take_line();
                self.include(&token, line);
            }
            Directive::Define => {
                let line = self.take_line();
                self.define(&token, line);
            }
            Directive::Undef => {
                let line = self.take_line();
                self.undef(&token, line);
            }
            Directive::Invalid(name) => {
                warn!("unknown directive #{name} at {}", token.span());
                self.report(Diagnostic::unknown_directive(name).with_location(token.span()));
            }
        }
    }

    /// Removes the rest of the current line, including the newline that ends it
    fn take_line(&mut self) -> Vec<Token> {
        self.current.cursor.remove_until(Token::is_newline)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.current.diagnostics.push(diagnostic);
    }

    fn malformed(&mut self, directive: &Token, reason: impl Into<String>) {
        let name = directive.directive_name().unwrap_or_default().to_string();
        let reason = reason.into();
        warn!("malformed #{name} at {}: {reason}", directive.span());
        self.report(Diagnostic::malformed_directive(name, reason).with_location(directive.span()));
    }

    fn include(&mut self, directive: &Token, line: Vec<Token>) {
        let name = match line.as_slice() {
            [token] => match token.kind() {
                TokenKind::String(name) | TokenKind::Identifier(name) => name.clone(),
                other => {
                    return self.malformed(directive, format!("expected a module name, found {other}"))
                }
            },
            [] => return self.malformed(directive, "missing module name"),
            [_, extra, ..] => {
                return self.malformed(directive, format!("unexpected {extra} after module name"))
            }
        };

        let unit = self.current.unit;
        let Some(including) = self.ctx.units.get(unit) else {
            return self.report(Diagnostic::new(
                format!("no source unit {unit} in this session"),
                ErrorLevel::Fatal,
            ));
        };
        let paths = match self.ctx.resolver.resolve(&name, including) {
            Ok(paths) => paths,
            Err(error) => return self.report(error.with_location(directive.span())),
        };
        debug!("resolved module {name:?} to {paths:?}");
        let resolved = paths.len();

        let mut module = Module::new(&name);
        for path in paths {
            match self.ctx.units.load(&path) {
                Ok(id) => module.push(id),
                Err(error) => self.report(error.with_location(directive.span())),
            }
        }

        let mut accepted = Module::new(&name);
        for &dependency in module.units() {
            if let Some(cycle) = self.cycle_through(dependency) {
                let cycle = cycle
                    .into_iter()
                    .filter_map(|id| self.ctx.units.get(id))
                    .map(|unit| unit.path().to_path_buf())
                    .collect::<Vec<_>>();
                warn!("refusing cyclic include of {name:?}: {cycle:?}");
                self.report(Diagnostic::cyclic_dependency(cycle).with_location(directive.span()));
                continue;
            }
            if let Err(GraphCyclic(cycle)) = self.ctx.graph.add_dependency(unit, dependency) {
                debug!("session graph already orders these units the other way: {cycle:?}");
            }
            accepted.push(dependency);
        }
        if accepted.is_empty() && resolved > 0 {
            return;
        }

        if let Some(source) = self.ctx.units.get_mut(unit) {
            source.add_dependency(accepted.clone());
        }
        self.current.include = Some(PendingInclude {
            name,
            waiting: accepted.units().iter().copied().collect(),
            spliced: vec![],
        });
    }

    fn define(&mut self, directive: &Token, line: Vec<Token>) {
        match parse_define(line) {
            Ok(mac) => {
                debug!("defining macro {mac}");
                if let Some(warning) = self.ctx.macros.define(mac) {
                    warn!("{}", warning.message());
                    self.report(warning);
                }
            }
            Err(reason) => self.malformed(directive, reason),
        }
    }

    fn undef(&mut self, directive: &Token, line: Vec<Token>) {
        match line.as_slice() {
            [token] => match token.identifier() {
                Some(name) => {
                    if self.ctx.macros.undefine(name) {
                        debug!("undefined macro {name}");
                    } else {
                        let warning = Diagnostic::undefined_macro(name).with_location(token.span());
                        self.report(warning);
                    }
                }
                None => self.malformed(directive, format!("expected a macro name, found {token}")),
            },
            [] => self.malformed(directive, "missing macro name"),
            [_, extra, ..] => {
                self.malformed(directive, format!("unexpected {extra} after macro name"))
            }
        }
    }
}

/// Parses the rest of a `#define` line:
/// `[proc] NAME [(p1, p2, ...)] [: type] [body...]`
fn parse_define(line: Vec<Token>) -> Result<Macro, String> {
    let mut tokens = line.into_iter().peekable();

    let kind = match consume_if(&mut tokens, |k| k == &TokenKind::Proc) {
        Some(_) => MacroKind::Procedural,
        None => MacroKind::Declarative,
    };

    let name_token = tokens.next().ok_or("missing macro name")?;
    let Some(name) = name_token.identifier() else {
        return Err(format!("expected a macro name, found {name_token}"));
    };
    let mut mac = Macro::new(name, kind).with_location(name_token.span());

    if consume_if(&mut tokens, |k| k == &TokenKind::LParen).is_some() {
        let mut params = vec![];
        if consume_if(&mut tokens, |k| k == &TokenKind::RParen).is_none() {
            loop {
                let param = tokens.next().ok_or("unclosed parameter list")?;
                let Some(param) = param.identifier() else {
                    return Err(format!("expected a parameter name, found {param}"));
                };
                params.push(param.to_string());
                match tokens.next().as_ref().map(Token::kind) {
                    Some(TokenKind::Comma) => continue,
                    Some(TokenKind::RParen) => break,
                    Some(other) => return Err(format!("expected `,` or `)`, found {other}")),
                    None => return Err("unclosed parameter list".to_string()),
                }
            }
        }
        mac = mac.with_params(params);
    }

    if consume_if(&mut tokens, |k| k == &TokenKind::Colon).is_some() {
        let ty = tokens.next().ok_or("missing type after `:`")?;
        let data_type = ty
            .identifier()
            .and_then(|id| PrimitiveType::from_str(id).ok())
            .ok_or_else(|| format!("{ty} is not a primitive type"))?;
        mac = mac.with_data_type(data_type);
    }

    Ok(mac.with_body(tokens))
}

fn consume_if<I, F>(tokens: &mut Peekable<I>, predicate: F) -> Option<Token>
where
    I: Iterator<Item = Token>,
    F: FnOnce(&TokenKind) -> bool,
{
    tokens.next_if(|token| predicate(token.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use viper_types::PrimitiveType;

    fn tokens(kinds: Vec<TokenKind>) -> Vec<Token> {
        kinds.into_iter().map(Token::call_site).collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.to_string())
    }

    #[test]
    fn test_parse_simple_define() {
        let mac = parse_define(tokens(vec![ident("ANSWER"), TokenKind::Integer(42)])).unwrap();
        assert_eq!(mac.name(), "ANSWER");
        assert_eq!(mac.kind(), MacroKind::Declarative);
        assert!(mac.params().is_empty());
        assert_eq!(mac.body().len(), 1);
    }

    #[test]
    fn test_parse_full_define() {
        let mac = parse_define(tokens(vec![
            TokenKind::Proc,
            ident("ADD"),
            TokenKind::LParen,
            ident("a"),
            TokenKind::Comma,
            ident("b"),
            TokenKind::RParen,
            TokenKind::Colon,
            ident("i64"),
            ident("a"),
            TokenKind::Plus,
            ident("b"),
        ]))
        .unwrap();
        assert_eq!(mac.to_string(), "proc ADD(a, b): i64");
        assert_eq!(mac.data_type(), Some(PrimitiveType::I64));
        assert_eq!(mac.body().len(), 3);
    }

    #[test]
    fn test_parse_empty_params() {
        let mac = parse_define(tokens(vec![ident("F"), TokenKind::LParen, TokenKind::RParen]))
            .unwrap();
        assert!(mac.params().is_empty());
        assert!(mac.body().is_empty());
    }

    #[test]
    fn test_parse_malformed_define() {
        assert!(parse_define(vec![]).is_err());
        assert!(parse_define(tokens(vec![TokenKind::Integer(1)])).is_err());
        assert!(parse_define(tokens(vec![ident("F"), TokenKind::LParen, ident("a")])).is_err());
        assert!(parse_define(tokens(vec![ident("F"), TokenKind::Colon, ident("Point")])).is_err());
    }
}
