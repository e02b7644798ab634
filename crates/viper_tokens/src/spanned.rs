//! A trait that can provide the [Span] of a token or any construct built from tokens

use std::fmt::{Display, Formatter};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

/// Something that knows where in a source file it came from
pub trait Spanned {
    fn span(&self) -> Span;
}

/// A byte range within a source file, along with the line and column it starts at.
///
/// Lines and columns are 1-based. The file path is shared, so cloning a span is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    file: Arc<Path>,
    offset: usize,
    len: usize,
    line: usize,
    col: usize,
}

impl Span {
    /// Creates a new span
    pub fn new(file: &Path, offset: usize, len: usize, line: usize, col: usize) -> Self {
        Self::from_shared(Arc::from(file), offset, len, line, col)
    }

    /// Creates a new span re-using an already shared file path
    pub fn from_shared(file: Arc<Path>, offset: usize, len: usize, line: usize, col: usize) -> Self {
        Self {
            file,
            offset,
            len,
            line,
            col,
        }
    }

    /// Creates a new span at the call site of this function
    #[track_caller]
    #[inline]
    pub fn call_site() -> Self {
        let location = Location::caller();
        Self::new(
            Path::new(location.file()),
            0,
            0,
            location.line() as usize,
            location.column() as usize,
        )
    }

    /// Gets an empty span directly after this span
    pub fn end(&self) -> Self {
        Self {
            file: self.file.clone(),
            offset: self.offset + self.len,
            len: 0,
            line: self.line,
            col: self.col + self.len,
        }
    }

    /// Creates a span that encompasses both, if both are from the same file
    pub fn join(&self, other: &Self) -> Option<Self> {
        if self.file != other.file {
            return None;
        }
        let (first, _) = if self.offset <= other.offset {
            (self, other)
        } else {
            (other, self)
        };
        let min = self.offset.min(other.offset);
        let max = (self.offset + self.len).max(other.offset + other.len);
        Some(Self {
            file: self.file.clone(),
            offset: min,
            len: max - min,
            line: first.line,
            col: first.col,
        })
    }

    /// Gets the file this span is from
    #[inline]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Gets the shared handle of the file this span is from
    #[inline]
    pub fn shared_file(&self) -> Arc<Path> {
        self.file.clone()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The 1-based line this span starts on
    pub fn line(&self) -> usize {
        self.line
    }

    /// The 1-based column this span starts on
    pub fn col(&self) -> usize {
        self.col
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        self.clone()
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_span_end() {
        let path = PathBuf::from("test");
        let p = Span::new(&path, 0, 5, 1, 1).end();
        assert_eq!(p.file(), path.as_path());
        assert_eq!(p.offset(), 5);
        assert_eq!(p.len(), 0);
        assert_eq!(p.col(), 6);
    }

    #[test]
    fn test_call_site() {
        let p = Span::call_site();
        assert_eq!(p.file(), Path::new(file!()));
        assert_eq!(p.line(), line!() as usize - 2);
    }

    #[test]
    fn test_join() {
        let p1 = Span::new(file!().as_ref(), 16, 8, 2, 3);
        let p2 = Span::new(file!().as_ref(), 0, 8, 1, 1);
        let joined = p1.join(&p2).unwrap();
        assert_eq!(joined.offset(), 0);
        assert_eq!(joined.len(), 24);
        assert_eq!(joined.line(), 1);
    }

    #[test]
    fn test_join_different_files() {
        let p1 = Span::new(Path::new("a"), 0, 1, 1, 1);
        let p2 = Span::new(Path::new("b"), 0, 1, 1, 1);
        assert!(p1.join(&p2).is_none());
    }
}
