use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Writes every `(relative path, content)` pair into a fresh temporary directory
pub fn source_dir(files: &[(&str, &str)]) -> eyre::Result<TempDir> {
    let dir = TempDir::new()?;
    write_sources(dir.path(), files)?;
    Ok(dir)
}

pub fn write_sources(root: &Path, files: &[(&str, &str)]) -> eyre::Result<()> {
    for (path, content) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}
