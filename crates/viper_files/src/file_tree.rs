use crate::SOURCE_EXTENSION;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Used for representing a hierarchy of files. Flattening a tree always yields files in path
/// order, so anything built from a tree is deterministic.
pub trait FileTree {
    type Path: AsRef<Path> + Ord;

    fn flatten(&self) -> BTreeSet<Self::Path>;
}

/// A tree rooted at a single path. A file is itself, a directory is every source file under it.
#[derive(Debug)]
pub struct SourceTree<P: AsRef<Path>> {
    src: P,
}

impl<P: AsRef<Path>> SourceTree<P> {
    pub fn new(src: P) -> Self {
        Self { src }
    }
}

impl<P: AsRef<Path>> FileTree for SourceTree<P> {
    type Path = PathBuf;

    fn flatten(&self) -> BTreeSet<Self::Path> {
        let root = self.src.as_ref().to_path_buf();
        if root.is_file() {
            return BTreeSet::from([root]);
        }

        let mut stack = vec![root];
        let mut visited = HashSet::new();
        let mut files = BTreeSet::new();

        while let Some(path) = stack.pop() {
            if visited.contains(&path) {
                continue;
            }
            visited.insert(path.clone());
            if path.is_file() {
                if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
                    files.insert(path);
                }
            } else if path.is_dir() {
                if let Ok(read_dir) = std::fs::read_dir(path) {
                    read_dir
                        .into_iter()
                        .filter_map(|i| i.ok())
                        .for_each(|entry| {
                            let path = entry.path();
                            stack.push(path);
                        })
                }
            }
        }

        files
    }
}
