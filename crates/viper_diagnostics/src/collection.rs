//! An ordered collection of diagnostics

use crate::diagnostic::{Diagnostic, SourceLookup};
use itertools::Itertools;

/// Diagnostics accumulated by one pass of the pipeline, in the order they were reported
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Checks if any fatal diagnostic was reported
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn fatals(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// Turns every warning into a fatal diagnostic
    pub fn escalate_warnings(self) -> Self {
        self.diagnostics
            .into_iter()
            .map(Diagnostic::escalated)
            .collect()
    }

    /// Renders every diagnostic, one after another
    pub fn render_with(&self, lookup: &dyn SourceLookup) -> String {
        self.diagnostics
            .iter()
            .map(|d| d.render_with(lookup))
            .join("\n")
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.diagnostics.extend(iter)
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self {
            diagnostics: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorLevel;

    #[test]
    fn test_counts() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::unknown_directive("pragma"));
        assert!(!diagnostics.has_fatal());
        diagnostics.push(Diagnostic::new("gone", ErrorLevel::Fatal));
        assert!(diagnostics.has_fatal());
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(diagnostics.fatals().count(), 1);
    }

    #[test]
    fn test_escalate_warnings() {
        let diagnostics = Diagnostics::from_iter([Diagnostic::macro_redefinition("M")]);
        assert!(diagnostics.escalate_warnings().has_fatal());
    }
}
