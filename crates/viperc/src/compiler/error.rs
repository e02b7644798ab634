//! Errors from running a compilation session

use itertools::Itertools as _;
use thiserror::Error;
use tokio::sync::AcquireError;
use tokio::task::JoinError;

/// Something went wrong with the session itself, rather than with the source it was compiling.
///
/// Problems with source files are reported as diagnostics and syntax errors on the
/// [`CompileOutput`](crate::CompileOutput) instead.
#[derive(Debug, Error)]
pub enum ViperCError {
    #[error("compile job failed: {0}")]
    Join(#[from] JoinError),
    #[error("job limiter closed: {0}")]
    Acquire(#[from] AcquireError),
    #[error("{}", .0.iter().join("\n"))]
    Multi(Vec<ViperCError>),
}

impl From<Vec<ViperCError>> for ViperCError {
    fn from(value: Vec<ViperCError>) -> Self {
        ViperCError::Multi(value)
    }
}

/// A type alias for general results in viperc
pub type ViperCResult<T> = Result<T, ViperCError>;
