use crate::UnitId;

/// A named group of source units, produced by resolving an include.
///
/// Naming a file yields a module of one unit, naming a directory yields every source file found
/// under it in path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    units: Vec<UnitId>,
}

impl Module {
    /// Creates an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: vec![],
        }
    }

    /// Creates a module containing only one unit
    pub fn single(name: impl Into<String>, unit: UnitId) -> Self {
        Self {
            name: name.into(),
            units: vec![unit],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// Adds a unit to this module, ignoring units already present
    pub fn push(&mut self, unit: UnitId) {
        if !self.contains(unit) {
            self.units.push(unit);
        }
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Extend<UnitId> for Module {
    fn extend<T: IntoIterator<Item = UnitId>>(&mut self, iter: T) {
        for unit in iter {
            self.push(unit);
        }
    }
}
