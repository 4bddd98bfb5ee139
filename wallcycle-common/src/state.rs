use std::fs;
use std::path::{Path, PathBuf};
use crate::error::{StateError, WallcycleError};
use crate::Result;

pub const DISLIKED_FILE: &str = "DislikedCheckpoint.json";
pub const FAVORITES_FILE: &str = "Favorites.json";

/// Whole-file JSON snapshots of the disliked and favorite path lists.
///
/// Every save overwrites the file in place; there is no temp-file rename,
/// so a crash mid-write can leave a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    disliked_file: PathBuf,
    favorites_file: PathBuf,
}

impl SnapshotStore {
    pub fn new(save_directory: &Path) -> Self {
        Self {
            disliked_file: save_directory.join(DISLIKED_FILE),
            favorites_file: save_directory.join(FAVORITES_FILE),
        }
    }

    pub fn load_disliked(&self) -> Result<Vec<PathBuf>> {
        load_paths(&self.disliked_file)
    }

    pub fn load_favorites(&self) -> Result<Vec<PathBuf>> {
        load_paths(&self.favorites_file)
    }

    pub fn save_disliked(&self, paths: &[PathBuf]) -> Result<()> {
        save_paths(&self.disliked_file, paths)
    }

    pub fn save_favorites(&self, paths: &[PathBuf]) -> Result<()> {
        save_paths(&self.favorites_file, paths)
    }

    /// Creates empty snapshot files that do not exist yet. Existing files are left alone.
    pub fn initialize(&self) -> Result<()> {
        for file in [&self.disliked_file, &self.favorites_file] {
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| WallcycleError::State(StateError::FileWrite {
                        path: parent.to_path_buf(),
                        source: e,
                    }))?;
            }

            if file.exists() {
                log::info!("Keeping existing snapshot {:?}", file);
                continue;
            }

            save_paths(file, &[])?;
            log::info!("Created empty snapshot {:?}", file);
        }
        Ok(())
    }
}

fn load_paths(file: &Path) -> Result<Vec<PathBuf>> {
    let json = fs::read_to_string(file)
        .map_err(|e| WallcycleError::State(StateError::FileRead {
            path: file.to_path_buf(),
            source: e,
        }))?;

    let paths: Vec<PathBuf> = serde_json::from_str(&json)
        .map_err(|e| WallcycleError::State(StateError::Corrupted {
            path: file.to_path_buf(),
            message: e.to_string(),
        }))?;

    log::debug!("Loaded {} paths from {:?}", paths.len(), file);
    Ok(paths)
}

fn save_paths(file: &Path, paths: &[PathBuf]) -> Result<()> {
    let json = serde_json::to_string_pretty(paths)
        .map_err(|_| WallcycleError::State(StateError::Serialization))?;

    fs::write(file, json)
        .map_err(|e| WallcycleError::State(StateError::FileWrite {
            path: file.to_path_buf(),
            source: e,
        }))?;

    log::debug!("Saved {} paths to {:?}", paths.len(), file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_save_load() {
        let temp_dir = tempdir().unwrap();
        let store = SnapshotStore::new(temp_dir.path());

        let disliked = vec![PathBuf::from("/walls/ugly.jpg"), PathBuf::from("/walls/meh.png")];
        let favorites = vec![
            PathBuf::from("/walls/nice.jpg"),
            PathBuf::from("/walls/nice.jpg"),
        ];

        store.save_disliked(&disliked).unwrap();
        store.save_favorites(&favorites).unwrap();

        assert_eq!(store.load_disliked().unwrap(), disliked);
        assert_eq!(store.load_favorites().unwrap(), favorites);
    }

    #[test]
    fn test_snapshot_is_plain_json_list() {
        let temp_dir = tempdir().unwrap();
        let store = SnapshotStore::new(temp_dir.path());

        store.save_favorites(&[PathBuf::from("/walls/a.jpg")]).unwrap();

        let raw = fs::read_to_string(&store.favorites_file).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["/walls/a.jpg".to_string()]);
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let store = SnapshotStore::new(temp_dir.path());

        match store.load_disliked().unwrap_err() {
            WallcycleError::State(StateError::FileRead { path, .. }) => {
                assert_eq!(path, temp_dir.path().join(DISLIKED_FILE));
            }
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_snapshot_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let store = SnapshotStore::new(temp_dir.path());
        fs::write(&store.favorites_file, "{\"not\": \"a list\"}").unwrap();

        assert!(matches!(
            store.load_favorites(),
            Err(WallcycleError::State(StateError::Corrupted { .. }))
        ));
    }

    #[test]
    fn test_initialize_keeps_existing_files() {
        let temp_dir = tempdir().unwrap();
        let store = SnapshotStore::new(&temp_dir.path().join("save"));

        store.initialize().unwrap();
        assert!(store.load_disliked().unwrap().is_empty());
        assert!(store.load_favorites().unwrap().is_empty());

        store.save_favorites(&[PathBuf::from("/walls/keep.jpg")]).unwrap();
        store.initialize().unwrap();
        assert_eq!(store.load_favorites().unwrap(), vec![PathBuf::from("/walls/keep.jpg")]);
    }
}
