//! Store abstraction for Pulsecheck's state management.
//!
//! A Store is the logical container for the consolidated survey database and
//! the broker audit log. All subsystem state (directory, survey, analysis,
//! reports) is scoped to one store rooted at `<project>/.pulsecheck/data/`.

use std::path::{Path, PathBuf};

pub const PROJECT_DIR_NAME: &str = ".pulsecheck";

/// Store handle representing a Pulsecheck state workspace.
#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute path to the store root directory (`<project>/.pulsecheck/data`)
    pub root: PathBuf,
}

impl Store {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The `.pulsecheck` directory holding the store plus operator config
    /// (`analysis.toml`).
    pub fn project_dir(&self) -> Option<PathBuf> {
        self.root.parent().map(Path::to_path_buf)
    }
}

/// Walks upward from `start` looking for a directory containing `.pulsecheck`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(PROJECT_DIR_NAME).is_dir() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Store root for a given project root.
pub fn store_root_for(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR_NAME).join("data")
}
