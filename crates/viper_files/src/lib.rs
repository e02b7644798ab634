#![doc = include_str!("../README.md")]

mod file_tree;
mod module;
mod source_unit;
mod units;

pub use self::{
    file_tree::{FileTree, SourceTree},
    module::Module,
    source_unit::{SourceUnit, UnitId},
    units::SourceUnits,
};
use std::path::{Path, PathBuf};

/// The extension of viper source files
pub const SOURCE_EXTENSION: &str = "vp";

/// Creates a file tree of every viper source file at or under `src`
pub fn source_tree<'a>(src: &'a Path) -> impl FileTree<Path = PathBuf> + 'a {
    SourceTree::new(src)
}

