//! A single loaded source file

use crate::Module;
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use viper_diagnostics::{Diagnostic, Location};
use viper_tokens::Span;

/// Identifies a unit within its session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub(crate) usize);

impl UnitId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for UnitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One loaded source file.
///
/// The content of a unit never changes once loaded. Only the dependency mapping grows, as the
/// preprocessor resolves the unit's includes.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    path: PathBuf,
    content: Arc<str>,
    display_name: String,
    line_delta: isize,
    file_number: Option<UnitId>,
    dependencies: IndexMap<String, Module>,
}

impl SourceUnit {
    /// Loads a source unit from the file system.
    ///
    /// # Error
    /// Returns a fatal diagnostic if the file can not be read or is not valid utf-8
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Diagnostic> {
        let path = path.as_ref();
        debug!("loading source unit {path:?}");
        let bytes = std::fs::read(path).map_err(|e| Diagnostic::io(path, &e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            Diagnostic::io(path, &io::Error::new(io::ErrorKind::InvalidData, e))
        })?;
        Ok(Self::from_source(path, content))
    }

    /// Creates a unit from text that is already in memory
    pub fn from_source(path: impl AsRef<Path>, content: impl Into<Arc<str>>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            display_name: path.display().to_string(),
            path,
            content: content.into(),
            line_delta: 0,
            file_number: None,
            dependencies: IndexMap::new(),
        }
    }

    /// Sets the name positions in this unit are reported under
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets how many lines reported positions are shifted by
    pub fn with_line_delta(mut self, line_delta: isize) -> Self {
        self.line_delta = line_delta;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn line_delta(&self) -> isize {
        self.line_delta
    }

    /// The id this unit was given by its [`SourceUnits`](crate::SourceUnits), if it has been added to one
    pub fn file_number(&self) -> Option<UnitId> {
        self.file_number
    }

    pub(crate) fn set_file_number(&mut self, id: UnitId) {
        self.file_number = Some(id);
    }

    /// The modules this unit includes, in the order they were first included
    pub fn dependencies(&self) -> &IndexMap<String, Module> {
        &self.dependencies
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// Records a module this unit depends on. Including the same name twice merges the modules.
    pub fn add_dependency(&mut self, module: Module) {
        match self.dependencies.get_mut(module.name()) {
            Some(existing) => existing.extend(module.units().iter().copied()),
            None => {
                self.dependencies.insert(module.name().to_string(), module);
            }
        }
    }

    /// Gets where a span within this unit should be reported
    pub fn location_of(&self, span: &Span) -> Location {
        let line = (span.line() as isize + self.line_delta).max(1) as usize;
        Location {
            display_name: self.display_name.clone(),
            line,
            col: span.col(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "let x: i32 = 0;").unwrap();
        let unit = SourceUnit::load(file.path()).expect("could not load");
        assert_eq!(unit.content(), "let x: i32 = 0;");
        assert_eq!(unit.path(), file.path());
        assert!(unit.dependencies().is_empty());
    }

    #[test]
    fn test_load_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceUnit::load(dir.path().join("missing.vp")).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_non_utf8_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        let err = SourceUnit::load(file.path()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_location_uses_display_name_and_delta() {
        let unit = SourceUnit::from_source("gen.vp", "")
            .with_display_name("<macro>")
            .with_line_delta(-2);
        let span = Span::new(Path::new("gen.vp"), 0, 1, 5, 3);
        let location = unit.location_of(&span);
        assert_eq!(location.to_string(), "<macro>:3:3");
    }

    #[test]
    fn test_add_dependency_merges() {
        let mut unit = SourceUnit::from_source("a.vp", "");
        unit.add_dependency(Module::single("b", UnitId(1)));
        unit.add_dependency(Module::single("b", UnitId(2)));
        assert!(unit.depends_on("b"));
        assert_eq!(unit.dependencies()["b"].units(), &[UnitId(1), UnitId(2)]);
    }
}
