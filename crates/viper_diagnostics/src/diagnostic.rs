//! A single diagnostic

use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use viper_tokens::Span;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorLevel {
    /// Recoverable or unrecommended, processing continues
    Warning,
    /// The affected local operation is abandoned. Never terminates the process by itself.
    Fatal,
}

impl Display for ErrorLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorLevel::Warning => f.write_str("warning"),
            ErrorLevel::Fatal => f.write_str("fatal"),
        }
    }
}

/// What went wrong
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("could not read {path:?}: {reason}")]
    Io { path: PathBuf, reason: String },
    #[error("cyclic dependency: {}", .cycle.iter().map(|p| p.display()).join(" -> "))]
    CyclicDependency { cycle: Vec<PathBuf> },
    #[error("could not tokenize {path:?}: {reason}")]
    Lex { path: PathBuf, reason: String },
    #[error("unknown directive #{0}")]
    UnknownDirective(String),
    #[error("macro {0:?} redefined, the previous definition is replaced")]
    MacroRedefinition(String),
    #[error("malformed #{directive} directive: {reason}")]
    MalformedDirective { directive: String, reason: String },
    #[error("macro {0:?} is not defined")]
    UndefinedMacro(String),
    #[error("{0}")]
    Custom(String),
}

impl DiagnosticKind {
    /// The severity this kind of diagnostic carries by default
    pub fn default_level(&self) -> ErrorLevel {
        match self {
            DiagnosticKind::Io { .. }
            | DiagnosticKind::CyclicDependency { .. }
            | DiagnosticKind::Lex { .. } => ErrorLevel::Fatal,
            DiagnosticKind::UnknownDirective(_)
            | DiagnosticKind::MacroRedefinition(_)
            | DiagnosticKind::MalformedDirective { .. }
            | DiagnosticKind::UndefinedMacro(_)
            | DiagnosticKind::Custom(_) => ErrorLevel::Warning,
        }
    }
}

/// A resolved, human facing position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub display_name: String,
    pub line: usize,
    pub col: usize,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.display_name, self.line, self.col)
    }
}

/// Maps a raw span onto the position a user should see, accounting for display names and line
/// offsets of the unit the span is from.
pub trait SourceLookup {
    fn locate(&self, span: &Span) -> Option<Location>;
}

/// A severity tagged message, optionally located in a source file.
///
/// Diagnostics are immutable once created, every builder method returns a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    level: ErrorLevel,
    location: Option<Span>,
}

impl Diagnostic {
    /// Creates a free form diagnostic with an explicit level
    pub fn new(message: impl Into<String>, level: ErrorLevel) -> Self {
        Self {
            kind: DiagnosticKind::Custom(message.into()),
            level,
            location: None,
        }
    }

    /// Creates a diagnostic of a given kind, at the kind's default level
    pub fn from_kind(kind: DiagnosticKind) -> Self {
        let level = kind.default_level();
        Self {
            kind,
            level,
            location: None,
        }
    }

    pub fn io(path: &Path, error: &io::Error) -> Self {
        Self::from_kind(DiagnosticKind::Io {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
    }

    pub fn cyclic_dependency<I: IntoIterator<Item = PathBuf>>(cycle: I) -> Self {
        Self::from_kind(DiagnosticKind::CyclicDependency {
            cycle: cycle.into_iter().collect(),
        })
    }

    pub fn lex(path: &Path, reason: impl Display) -> Self {
        Self::from_kind(DiagnosticKind::Lex {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        })
    }

    pub fn unknown_directive(name: impl Into<String>) -> Self {
        Self::from_kind(DiagnosticKind::UnknownDirective(name.into()))
    }

    pub fn macro_redefinition(name: impl Into<String>) -> Self {
        Self::from_kind(DiagnosticKind::MacroRedefinition(name.into()))
    }

    pub fn malformed_directive(directive: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::from_kind(DiagnosticKind::MalformedDirective {
            directive: directive.into(),
            reason: reason.into(),
        })
    }

    pub fn undefined_macro(name: impl Into<String>) -> Self {
        Self::from_kind(DiagnosticKind::UndefinedMacro(name.into()))
    }

    /// Attaches a source location to this diagnostic
    pub fn with_location(self, location: impl Into<Option<Span>>) -> Self {
        Self {
            location: location.into(),
            ..self
        }
    }

    /// Escalates a warning to fatal, used when warnings are treated as errors
    pub fn escalated(self) -> Self {
        Self {
            level: ErrorLevel::Fatal,
            ..self
        }
    }

    pub fn kind(&self) -> &DiagnosticKind {
        &self.kind
    }

    pub fn level(&self) -> ErrorLevel {
        self.level
    }

    pub fn location(&self) -> Option<&Span> {
        self.location.as_ref()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.level == ErrorLevel::Fatal
    }

    #[inline]
    pub fn is_warning(&self) -> bool {
        self.level == ErrorLevel::Warning
    }

    /// Renders this diagnostic as text, reporting the raw span position if there is one
    pub fn render(&self) -> String {
        let location = self.location.as_ref().map(|span| Location {
            display_name: span.file().display().to_string(),
            line: span.line(),
            col: span.col(),
        });
        self.render_at(location)
    }

    /// Renders this diagnostic as text, letting `lookup` translate the span into a display position
    pub fn render_with(&self, lookup: &dyn SourceLookup) -> String {
        match &self.location {
            Some(span) => self.render_at(lookup.locate(span)),
            None => self.render_at(None),
        }
    }

    fn render_at(&self, location: Option<Location>) -> String {
        match location {
            None => format!("{}: {}", self.level, self.kind),
            Some(location) => format!("{}: {}\n  -> {}", self.level, self.kind, location),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::error::Error for Diagnostic {}

impl From<DiagnosticKind> for Diagnostic {
    fn from(value: DiagnosticKind) -> Self {
        Self::from_kind(value)
    }
}
