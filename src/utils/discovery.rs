use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Expand a glob pattern relative to the raster root directory into a
/// lexicographically sorted file list. Sorted order makes a run
/// deterministic and keeps forecast timestamps monotonic per tower.
///
/// Zero matches is a valid outcome, not an error.
pub fn discover_files(root_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = root_dir.join(pattern);
    let full_pattern = full_pattern.to_string_lossy();

    let mut files: Vec<PathBuf> = glob::glob(&full_pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "skipping unreadable path during discovery");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_discovery_sorts_lexicographically() -> Result<()> {
        let temp = TempDir::new()?;
        touch(temp.path(), "2024-02-01_00.tif");
        touch(temp.path(), "2024-01-15_12.tif");
        touch(temp.path(), "2024-01-15_00.tif");

        let files = discover_files(temp.path(), "*.tif")?;
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec!["2024-01-15_00.tif", "2024-01-15_12.tif", "2024-02-01_00.tif"]
        );
        Ok(())
    }

    #[test]
    fn test_discovery_filters_by_pattern() -> Result<()> {
        let temp = TempDir::new()?;
        touch(temp.path(), "wind.tif");
        touch(temp.path(), "notes.txt");

        let files = discover_files(temp.path(), "*.tif")?;
        assert_eq!(files.len(), 1);
        Ok(())
    }

    #[test]
    fn test_zero_matches_is_not_an_error() -> Result<()> {
        let temp = TempDir::new()?;
        let files = discover_files(temp.path(), "ice_mass/*.tif")?;
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(discover_files(temp.path(), "[").is_err());
    }
}
