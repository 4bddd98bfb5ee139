use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::error::{WallcycleError, ImageDiscoveryError};
use crate::Result;

pub struct ImageDiscovery;

impl ImageDiscovery {
    /// Recursively lists every file under `root`, following symlinks.
    pub fn index(root: &Path) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(WallcycleError::ImageDiscovery(ImageDiscoveryError::DirectoryRead {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "Directory not found"),
            }));
        }

        if !root.is_dir() {
            return Err(WallcycleError::ImageDiscovery(ImageDiscoveryError::DirectoryRead {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "Path is not a directory"),
            }));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {:?}: {}", root, e);
                    continue;
                }
            };

            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        log::info!("Indexed {} files in {:?}", files.len(), root);
        Ok(files)
    }

    /// Keeps files whose path ends with one of `extensions` (case-insensitive,
    /// leading dot optional) and that are not in `disliked`.
    pub fn candidates(files: Vec<PathBuf>, extensions: &[String], disliked: &[PathBuf]) -> Vec<PathBuf> {
        let suffixes: Vec<String> = extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .filter(|ext| ext.len() > 1)
            .collect();

        files
            .into_iter()
            .filter(|path| {
                let lowered = path.to_string_lossy().to_lowercase();
                suffixes.iter().any(|suffix| lowered.ends_with(suffix.as_str()))
            })
            .filter(|path| !disliked.contains(path))
            .collect()
    }

    /// Counts files per extension. Files without an extension are counted under `""`.
    pub fn extension_histogram(files: &[PathBuf]) -> BTreeMap<String, usize> {
        let mut histogram = BTreeMap::new();

        for file in files {
            let extension = file
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            *histogram.entry(extension).or_insert(0) += 1;
        }

        histogram
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use std::fs;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_index_walks_subdirectories() {
        let temp_dir = tempdir().unwrap();
        let test_dir = temp_dir.path();

        let subdir = test_dir.join("subdir");
        fs::create_dir(&subdir).unwrap();

        fs::write(test_dir.join("root.jpg"), "fake jpg").unwrap();
        fs::write(subdir.join("sub.png"), "fake png").unwrap();
        fs::write(subdir.join("notes.txt"), "text").unwrap();

        let files = ImageDiscovery::index(test_dir).unwrap();

        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|p| p.file_name().unwrap() == "root.jpg"));
        assert!(files.iter().any(|p| p.file_name().unwrap() == "sub.png"));
        assert!(files.iter().any(|p| p.file_name().unwrap() == "notes.txt"));
    }

    #[test]
    fn test_index_nonexistent_directory() {
        let nonexistent_path = Path::new("/nonexistent/directory");

        match ImageDiscovery::index(nonexistent_path).unwrap_err() {
            WallcycleError::ImageDiscovery(ImageDiscoveryError::DirectoryRead { path, .. }) => {
                assert_eq!(path, nonexistent_path);
            },
            _ => panic!("Expected DirectoryRead error"),
        }
    }

    #[test]
    fn test_index_empty_directory_is_not_an_error() {
        let temp_dir = tempdir().unwrap();

        let files = ImageDiscovery::index(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_candidates_filters_extensions_case_insensitive() {
        let files = vec![
            PathBuf::from("/w/a.JPG"),
            PathBuf::from("/w/b.png"),
            PathBuf::from("/w/c.txt"),
            PathBuf::from("/w/d.jpeg"),
        ];

        let candidates = ImageDiscovery::candidates(files, &exts(&[".jpg", "png"]), &[]);

        assert_eq!(candidates, vec![PathBuf::from("/w/a.JPG"), PathBuf::from("/w/b.png")]);
    }

    #[test]
    fn test_candidates_excludes_disliked() {
        let files = vec![PathBuf::from("/w/a.jpg"), PathBuf::from("/w/b.jpg")];
        let disliked = vec![PathBuf::from("/w/a.jpg")];

        let candidates = ImageDiscovery::candidates(files, &exts(&[".jpg"]), &disliked);

        assert_eq!(candidates, vec![PathBuf::from("/w/b.jpg")]);
    }

    #[test]
    fn test_candidates_overlapping_extensions_do_not_duplicate() {
        let files = vec![PathBuf::from("/w/a.jpg")];

        let candidates = ImageDiscovery::candidates(files, &exts(&[".jpg", "jpg", "JPG"]), &[]);

        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_extension_histogram() {
        let files = vec![
            PathBuf::from("/w/a.jpg"),
            PathBuf::from("/w/b.jpg"),
            PathBuf::from("/w/c.png"),
            PathBuf::from("/w/README"),
        ];

        let histogram = ImageDiscovery::extension_histogram(&files);

        assert_eq!(histogram.get(".jpg"), Some(&2));
        assert_eq!(histogram.get(".png"), Some(&1));
        assert_eq!(histogram.get(""), Some(&1));
        assert_eq!(histogram.len(), 3);
    }
}
