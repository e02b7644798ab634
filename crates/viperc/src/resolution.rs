//! Finds included modules on the file system

use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;
use viper_ast_parsing::lexer::tokenize;
use viper_diagnostics::Diagnostic;
use viper_files::{source_tree, FileTree, SourceUnit, SOURCE_EXTENSION};
use viper_preprocessor::ModuleResolver;
use viper_tokens::Token;

/// Resolves include names against the directory of the including file, then against each search
/// path in order.
#[derive(Debug, Clone, Default)]
pub struct FsModuleResolver {
    search_paths: Vec<PathBuf>,
}

impl FsModuleResolver {
    /// Creates a resolver that searches the given directories after the including file's own
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Looks for `name` in a single directory. A file is tried as written, then with the source
    /// extension, and a directory becomes every source file under it.
    fn find_in(dir: &Path, name: &str) -> Option<Vec<PathBuf>> {
        let exact = dir.join(name);
        if exact.is_file() {
            return Some(vec![exact]);
        }
        let with_extension = dir.join(format!("{name}.{SOURCE_EXTENSION}"));
        if with_extension.is_file() {
            return Some(vec![with_extension]);
        }
        if exact.is_dir() {
            return Some(source_tree(&exact).flatten().into_iter().collect());
        }
        None
    }
}

impl ModuleResolver for FsModuleResolver {
    fn resolve(&self, name: &str, including: &SourceUnit) -> Result<Vec<PathBuf>, Diagnostic> {
        let local = including.path().parent().map(Path::to_path_buf);
        let dirs = local.iter().chain(self.search_paths.iter());
        for dir in dirs {
            trace!("looking for {name:?} in {dir:?}");
            if let Some(paths) = Self::find_in(dir, name) {
                return Ok(paths);
            }
        }
        let error = io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "no module named {name:?} next to {:?} or in {} search paths",
                including.display_name(),
                self.search_paths.len()
            ),
        );
        Err(Diagnostic::io(Path::new(name), &error))
    }

    fn tokenize(&self, unit: &SourceUnit) -> Result<Vec<Token>, Diagnostic> {
        tokenize(unit.path(), unit.content()).map_err(|e| Diagnostic::lex(unit.path(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use viper_diagnostics::DiagnosticKind;

    fn unit_in(dir: &Path) -> SourceUnit {
        SourceUnit::from_source(dir.join("main.vp"), "")
    }

    #[test]
    fn test_resolve_with_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("util.vp"), "").unwrap();
        let resolver = FsModuleResolver::default();
        let paths = resolver.resolve("util", &unit_in(dir.path())).unwrap();
        assert_eq!(paths, vec![dir.path().join("util.vp")]);
    }

    #[test]
    fn test_resolve_exact_name_first() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("util"), "").unwrap();
        fs::write(dir.path().join("util.vp"), "").unwrap();
        let resolver = FsModuleResolver::default();
        let paths = resolver.resolve("util", &unit_in(dir.path())).unwrap();
        assert_eq!(paths, vec![dir.path().join("util")]);
    }

    #[test]
    fn test_resolve_directory() {
        let dir = TempDir::new().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("nested")).unwrap();
        fs::write(lib.join("b.vp"), "").unwrap();
        fs::write(lib.join("nested").join("a.vp"), "").unwrap();
        fs::write(lib.join("readme.md"), "").unwrap();
        let resolver = FsModuleResolver::default();
        let paths = resolver.resolve("lib", &unit_in(dir.path())).unwrap();
        assert_eq!(paths, vec![lib.join("b.vp"), lib.join("nested").join("a.vp")]);
    }

    #[test]
    fn test_resolve_search_paths() {
        let local = TempDir::new().unwrap();
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(second.path().join("shared.vp"), "").unwrap();
        let resolver = FsModuleResolver::new([first.path(), second.path()]);
        let paths = resolver.resolve("shared", &unit_in(local.path())).unwrap();
        assert_eq!(paths, vec![second.path().join("shared.vp")]);
    }

    #[test]
    fn test_unresolved_is_fatal_io() {
        let local = TempDir::new().unwrap();
        let resolver = FsModuleResolver::default();
        let error = resolver
            .resolve("missing", &unit_in(local.path()))
            .unwrap_err();
        assert!(error.is_fatal());
        assert!(matches!(error.kind(), DiagnosticKind::Io { .. }));
    }

    #[test]
    fn test_tokenize_error_is_fatal_lex() {
        let resolver = FsModuleResolver::default();
        let unit = SourceUnit::from_source("bad.vp", "let $ = 1;");
        let error = resolver.tokenize(&unit).unwrap_err();
        assert!(error.is_fatal());
        assert!(matches!(error.kind(), DiagnosticKind::Lex { .. }));
    }
}
