//! Responsible with turning viper files into syntax trees

use crate::resolution::FsModuleResolver;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error_span, info, instrument, Instrument};
use viper_ast::Ast;
use viper_ast_parsing::parser::{Parser, SyntaxError};
use viper_diagnostics::{Diagnostics, SourceLookup};
use viper_files::{SourceUnits, UnitId};
use viper_preprocessor::PreprocessContext;
use viper_tokens::TokenStream;

pub mod error;

pub use error::{ViperCError, ViperCResult};

/// Responsible with compiling viper files into syntax trees.
///
/// Must be configured using a [ViperCBuilder].
#[derive(Debug, Clone)]
pub struct ViperC {
    max_jobs: usize,
    search_paths: Vec<PathBuf>,
    warnings_as_errors: bool,
}

impl ViperC {
    /// Creates the default ViperCBuilder
    #[inline]
    pub fn builder() -> ViperCBuilder {
        ViperCBuilder::new()
    }

    /// The directories searched for includes, after the including file's own
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The most files compiled at once by [compile_all](Self::compile_all)
    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }

    /// Creates the resolver used to find includes
    pub fn resolver(&self) -> FsModuleResolver {
        FsModuleResolver::new(self.search_paths.iter().cloned())
    }

    /// Compiles a file at a given path.
    ///
    /// Every file gets a session of its own, so nothing is shared with other compilations.
    /// Problems with the source are reported in the output, this never fails.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn compile(&self, path: &Path) -> CompileOutput {
        let mut ctx = PreprocessContext::new(self.resolver());
        let (unit, preprocessed) = ctx.preprocess_file(path);
        debug!(
            "preprocessed into {} tokens with {} diagnostics",
            preprocessed.tokens.len(),
            preprocessed.diagnostics.len()
        );

        let parsed = Parser::new(preprocessed.tokens.iter().cloned()).parse();
        let diagnostics = if self.warnings_as_errors {
            preprocessed.diagnostics.escalate_warnings()
        } else {
            preprocessed.diagnostics
        };

        let output = CompileOutput {
            path: path.to_path_buf(),
            unit,
            units: ctx.into_units(),
            tokens: preprocessed.tokens,
            ast: parsed.ast,
            diagnostics,
            syntax_errors: parsed.errors,
        };
        info!(
            "compiled {} with {} diagnostics and {} syntax errors",
            path.display(),
            output.diagnostics.len(),
            output.syntax_errors.len()
        );
        output
    }

    /// Compiles many files, running at most as many at once as the configured job count.
    ///
    /// Outputs are returned in the same order as `paths`.
    pub async fn compile_all(&self, paths: Vec<PathBuf>) -> ViperCResult<Vec<CompileOutput>> {
        let limiter = Arc::new(Semaphore::new(self.max_jobs));
        let mut join_set = JoinSet::new();
        for (index, path) in paths.into_iter().enumerate() {
            let compiler = self.clone();
            let limiter = limiter.clone();
            let span = error_span!("compile", path = ?path);
            join_set.spawn(
                async move {
                    let _permit = limiter.acquire_owned().await?;
                    let output =
                        tokio::task::spawn_blocking(move || compiler.compile(&path)).await?;
                    Ok::<_, ViperCError>((index, output))
                }
                .instrument(span),
            );
        }

        let mut outputs = vec![];
        let mut errors = vec![];
        for result in join_set.join_all().await {
            match result {
                Ok(output) => outputs.push(output),
                Err(error) => errors.push(error),
            }
        }
        if !errors.is_empty() {
            return Err(ViperCError::from(errors));
        }
        outputs.sort_by_key(|(index, _)| *index);
        Ok(outputs.into_iter().map(|(_, output)| output).collect())
    }
}

/// Everything produced by compiling one file
#[derive(Debug)]
pub struct CompileOutput {
    /// The file that was compiled
    pub path: PathBuf,
    /// The unit of the compiled file, if it could be loaded
    pub unit: Option<UnitId>,
    /// Every unit loaded while compiling, the compiled file and everything it included
    pub units: SourceUnits,
    /// The preprocessed tokens the ast was parsed from
    pub tokens: TokenStream,
    pub ast: Ast,
    pub diagnostics: Diagnostics,
    pub syntax_errors: Vec<SyntaxError>,
}

impl CompileOutput {
    /// Checks that no fatal diagnostic or syntax error was reported
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_fatal() && self.syntax_errors.is_empty()
    }

    /// Renders the diagnostics, with locations adjusted by the units they point into
    pub fn render_diagnostics(&self) -> String {
        self.diagnostics.render_with(self.lookup())
    }

    /// Translates spans into display locations
    pub fn lookup(&self) -> &dyn SourceLookup {
        &self.units
    }
}

/// Builder for creating a [ViperC] instance.
#[derive(Debug)]
pub struct ViperCBuilder {
    /// Number of jobs to run at once
    pub jobs: usize,
    pub search_paths: Vec<PathBuf>,
    pub warnings_as_errors: bool,
}

impl ViperCBuilder {
    /// Creates a ViperCBuilder with default settings
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of files compiled at once
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Adds a directory to search for includes in
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds directories to search for includes in
    pub fn search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.search_paths
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Reports every warning as fatal
    pub fn warnings_as_errors(mut self, warnings_as_errors: bool) -> Self {
        self.warnings_as_errors = warnings_as_errors;
        self
    }

    /// Builds a [ViperC] instance from this builder
    pub fn build(self) -> Result<ViperC, BuildViperCError> {
        if self.jobs == 0 {
            return Err(BuildViperCError::ZeroJobs);
        }

        for search_path in &self.search_paths {
            let meta = std::fs::metadata(search_path).map_err(|e| {
                BuildViperCError::SearchPathDoesNotExist(search_path.clone(), e)
            })?;
            if !meta.is_dir() {
                return Err(BuildViperCError::SearchPathIsNotADirectory(
                    search_path.clone(),
                ));
            }
        }
        Ok(ViperC {
            max_jobs: self.jobs,
            search_paths: self.search_paths,
            warnings_as_errors: self.warnings_as_errors,
        })
    }
}

impl Default for ViperCBuilder {
    fn default() -> Self {
        Self {
            jobs: num_cpus::get(),
            search_paths: vec![],
            warnings_as_errors: false,
        }
    }
}

/// An error occurred while building a [ViperC] instance
#[derive(Debug, Error)]
pub enum BuildViperCError {
    #[error("search path {0:?} does not exist: {1}")]
    SearchPathDoesNotExist(PathBuf, io::Error),
    #[error("search path {0:?} is not a directory")]
    SearchPathIsNotADirectory(PathBuf),
    #[error("Compilation can't occur if no jobs are allowed")]
    ZeroJobs,
}
