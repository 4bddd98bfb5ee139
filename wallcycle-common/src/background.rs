use std::path::{Path, PathBuf};
use crate::Result;

/// Platform hook for reading and replacing the desktop background.
pub trait Background: Send {
    /// The image currently shown on the desktop.
    fn current(&self) -> Result<PathBuf>;

    fn set(&self, image: &Path) -> Result<()>;
}
