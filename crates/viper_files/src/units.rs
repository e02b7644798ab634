use crate::{SourceUnit, UnitId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;
use viper_diagnostics::{Diagnostic, Location, SourceLookup};
use viper_tokens::Span;

/// Owns every source unit loaded during a session. Units are deduplicated by path.
#[derive(Debug, Default)]
pub struct SourceUnits {
    units: Vec<SourceUnit>,
    by_path: HashMap<PathBuf, UnitId>,
}

impl SourceUnits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit, returning its id. If a unit with the same path is already present, the
    /// existing unit is kept and its id returned.
    pub fn insert(&mut self, mut unit: SourceUnit) -> UnitId {
        if let Some(id) = self.by_path.get(unit.path()) {
            return *id;
        }
        let id = UnitId(self.units.len());
        trace!("registering {:?} as unit {id}", unit.path());
        unit.set_file_number(id);
        self.by_path.insert(unit.path().to_path_buf(), id);
        self.units.push(unit);
        id
    }

    /// Loads the unit at the given path, unless it was already loaded
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<UnitId, Diagnostic> {
        let path = normalize(path.as_ref());
        if let Some(id) = self.by_path.get(&path) {
            return Ok(*id);
        }
        let unit = SourceUnit::load(&path)?;
        Ok(self.insert(unit))
    }

    pub fn id_of(&self, path: impl AsRef<Path>) -> Option<UnitId> {
        let path = path.as_ref();
        self.by_path
            .get(path)
            .or_else(|| self.by_path.get(&normalize(path)))
            .copied()
    }

    pub fn get(&self, id: UnitId) -> Option<&SourceUnit> {
        self.units.get(id.0)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut SourceUnit> {
        self.units.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &SourceUnit)> {
        self.units
            .iter()
            .enumerate()
            .map(|(index, unit)| (UnitId(index), unit))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl SourceLookup for SourceUnits {
    fn locate(&self, span: &Span) -> Option<Location> {
        let unit = self.id_of(span.file()).and_then(|id| self.get(id));
        Some(match unit {
            Some(unit) => unit.location_of(span),
            None => Location {
                display_name: span.file().display().to_string(),
                line: span.line(),
                col: span.col(),
            },
        })
    }
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dedupe_by_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.vp");
        fs::write(&file, "let a: i32 = 1;").unwrap();

        let mut units = SourceUnits::new();
        let first = units.load(&file).unwrap();
        let second = units.load(dir.path().join(".").join("a.vp")).unwrap();
        assert_eq!(first, second);
        assert_eq!(units.len(), 1);
        assert_eq!(units.get(first).unwrap().file_number(), Some(first));
    }

    #[test]
    fn test_virtual_units() {
        let mut units = SourceUnits::new();
        let a = units.insert(SourceUnit::from_source("a.vp", "1;"));
        let b = units.insert(SourceUnit::from_source("b.vp", "2;"));
        assert_ne!(a, b);
        assert_eq!(units.insert(SourceUnit::from_source("a.vp", "3;")), a);
        assert_eq!(units.get(a).unwrap().content(), "1;");
    }

    #[test]
    fn test_lookup_applies_display_name() {
        let mut units = SourceUnits::new();
        units.insert(SourceUnit::from_source("a.vp", "").with_display_name("alpha"));
        let span = Span::new(Path::new("a.vp"), 0, 1, 1, 1);
        let diagnostic = Diagnostic::unknown_directive("x").with_location(span);
        assert_eq!(
            diagnostic.render_with(&units),
            "warning: unknown directive #x\n  -> alpha:1:1"
        );
    }
}
