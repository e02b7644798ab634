use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use viper_ast_parsing::lexer::tokenize;
use viper_diagnostics::Diagnostic;
use viper_files::{source_tree, FileTree, SourceUnit, SOURCE_EXTENSION};
use viper_preprocessor::ModuleResolver;
use viper_tokens::Token;

/// Resolves includes relative to the directory of the including file
#[derive(Debug, Default)]
pub struct RelativeResolver;

impl ModuleResolver for RelativeResolver {
    fn resolve(&self, name: &str, including: &SourceUnit) -> Result<Vec<PathBuf>, Diagnostic> {
        let dir = including.path().parent().unwrap_or(Path::new("."));
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Ok(source_tree(&candidate).flatten().into_iter().collect());
        }
        let file = candidate.with_extension(SOURCE_EXTENSION);
        if file.is_file() {
            Ok(vec![file])
        } else {
            Err(Diagnostic::io(
                &file,
                &io::Error::from(io::ErrorKind::NotFound),
            ))
        }
    }

    fn tokenize(&self, unit: &SourceUnit) -> Result<Vec<Token>, Diagnostic> {
        tokenize(unit.path(), unit.content()).map_err(|e| Diagnostic::lex(unit.path(), e))
    }
}

/// Writes every `(relative path, content)` pair into a fresh temporary directory
pub fn write_sources(files: &[(&str, &str)]) -> eyre::Result<TempDir> {
    let dir = TempDir::new()?;
    for (path, content) in files {
        let path = dir.path().join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(dir)
}
