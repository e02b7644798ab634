//! Macro definitions and the table they are stored in

use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use viper_diagnostics::Diagnostic;
use viper_tokens::{Span, Token, TokenStream};
use viper_types::PrimitiveType;

/// How a macro was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    /// `#define NAME ...`
    Declarative,
    /// `#define proc NAME ...`
    Procedural,
}

/// A named macro definition. The body is stored as written and never expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    name: String,
    kind: MacroKind,
    params: Vec<String>,
    data_type: Option<PrimitiveType>,
    body: TokenStream,
    location: Option<Span>,
}

impl Macro {
    pub fn new(name: impl Into<String>, kind: MacroKind) -> Self {
        Self {
            name: name.into(),
            kind,
            params: vec![],
            data_type: None,
            body: TokenStream::new(),
            location: None,
        }
    }

    pub fn with_params<I: IntoIterator<Item = S>, S: Into<String>>(mut self, params: I) -> Self {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<Option<PrimitiveType>>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn with_body<I: IntoIterator<Item = Token>>(mut self, body: I) -> Self {
        self.body = body.into_iter().collect();
        self
    }

    pub fn with_location(mut self, location: Span) -> Self {
        self.location = Some(location);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MacroKind {
        self.kind
    }

    pub fn is_procedural(&self) -> bool {
        self.kind == MacroKind::Procedural
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn data_type(&self) -> Option<PrimitiveType> {
        self.data_type
    }

    pub fn body(&self) -> &TokenStream {
        &self.body
    }

    pub fn location(&self) -> Option<&Span> {
        self.location.as_ref()
    }
}

impl Display for Macro {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_procedural() {
            write!(f, "proc ")?;
        }
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.iter().join(", "))?;
        }
        if let Some(data_type) = self.data_type {
            write!(f, ": {data_type}")?;
        }
        Ok(())
    }
}

/// Every macro defined during a session, keyed by name
#[derive(Debug, Default, Clone)]
pub struct MacroTable {
    macros: IndexMap<String, Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a macro. Redefining an existing name replaces it and returns a warning.
    pub fn define(&mut self, mac: Macro) -> Option<Diagnostic> {
        let location = mac.location.clone();
        let name = mac.name.clone();
        self.macros.insert(name.clone(), mac).map(|_previous| {
            Diagnostic::macro_redefinition(name).with_location(location)
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Removes a macro, returning whether it was defined
    pub fn undefine(&mut self, name: &str) -> bool {
        self.macros.shift_remove(name).is_some()
    }

    /// Iterates over every macro, in the order they were first defined
    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.values()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viper_tokens::TokenKind;

    #[test]
    fn test_define_and_lookup() {
        let mut table = MacroTable::new();
        assert!(table
            .define(Macro::new("MAX", MacroKind::Declarative)
                .with_body([Token::call_site(TokenKind::Integer(10))]))
            .is_none());
        let found = table.lookup("MAX").expect("MAX should be defined");
        assert_eq!(found.body().len(), 1);
        assert!(table.lookup("MIN").is_none());
    }

    #[test]
    fn test_redefinition_last_wins() {
        let mut table = MacroTable::new();
        table.define(Macro::new("M", MacroKind::Declarative).with_data_type(PrimitiveType::I32));
        let warning = table
            .define(Macro::new("M", MacroKind::Procedural).with_params(["a", "b"]))
            .expect("redefinition should warn");
        assert!(warning.is_warning());
        assert_eq!(table.len(), 1);
        let m = table.lookup("M").unwrap();
        assert_eq!(m.kind(), MacroKind::Procedural);
        assert_eq!(m.params(), &["a".to_string(), "b".to_string()]);
        assert_eq!(m.data_type(), None);
    }

    #[test]
    fn test_undefine() {
        let mut table = MacroTable::new();
        table.define(Macro::new("A", MacroKind::Declarative));
        table.define(Macro::new("B", MacroKind::Declarative));
        assert!(table.undefine("A"));
        assert!(!table.undefine("A"));
        assert_eq!(table.iter().map(Macro::name).collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn test_display() {
        let m = Macro::new("SQUARE", MacroKind::Procedural)
            .with_params(["x"])
            .with_data_type(PrimitiveType::F64);
        assert_eq!(m.to_string(), "proc SQUARE(x): f64");
    }
}
