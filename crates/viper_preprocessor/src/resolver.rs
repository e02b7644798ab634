//! How include names are turned into source units and their tokens

use std::path::PathBuf;
use viper_diagnostics::Diagnostic;
use viper_files::SourceUnit;
use viper_tokens::Token;

/// Resolves include names and tokenizes the units they name.
///
/// The preprocessor does not know where source files live or how they are lexed, both are the
/// resolver's business.
pub trait ModuleResolver {
    /// Gets the files that make up the module `name`, as included from `including`.
    ///
    /// # Error
    /// Returns a fatal diagnostic if the module can't be found
    fn resolve(&self, name: &str, including: &SourceUnit) -> Result<Vec<PathBuf>, Diagnostic>;

    /// Turns a source unit into tokens
    fn tokenize(&self, unit: &SourceUnit) -> Result<Vec<Token>, Diagnostic>;
}

impl<R: ModuleResolver + ?Sized> ModuleResolver for &R {
    fn resolve(&self, name: &str, including: &SourceUnit) -> Result<Vec<PathBuf>, Diagnostic> {
        (**self).resolve(name, including)
    }

    fn tokenize(&self, unit: &SourceUnit) -> Result<Vec<Token>, Diagnostic> {
        (**self).tokenize(unit)
    }
}

impl<R: ModuleResolver + ?Sized> ModuleResolver for Box<R> {
    fn resolve(&self, name: &str, including: &SourceUnit) -> Result<Vec<PathBuf>, Diagnostic> {
        (**self).resolve(name, including)
    }

    fn tokenize(&self, unit: &SourceUnit) -> Result<Vec<Token>, Diagnostic> {
        (**self).tokenize(unit)
    }
}
