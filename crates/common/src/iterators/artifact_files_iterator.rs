use std::path::{Path, PathBuf};

/// An iterator over the contract artifact files found under a build directory, similar to the
/// glob `${path}/**/*.json`.
///
/// Hardhat writes a `*.dbg.json` debug file next to every artifact; those are skipped.
pub struct ArtifactFilesIterator {
    /// The directories left to visit. Directories are only read once every file found so far has
    /// been returned.
    directories_to_search: Vec<PathBuf>,

    /// Artifact files that were found and not yet returned.
    artifact_files: Vec<PathBuf>,
}

impl ArtifactFilesIterator {
    const ARTIFACT_EXTENSION: &str = "json";
    const DEBUG_ARTIFACT_SUFFIX: &str = ".dbg.json";

    pub fn new(root_directory: impl AsRef<Path>) -> Self {
        Self {
            directories_to_search: vec![root_directory.as_ref().to_path_buf()],
            artifact_files: Default::default(),
        }
    }

    fn is_artifact_file(path: &Path) -> bool {
        let has_extension = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case(Self::ARTIFACT_EXTENSION));
        let is_debug_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(Self::DEBUG_ARTIFACT_SUFFIX));
        path.is_file() && has_extension && !is_debug_file
    }
}

impl Iterator for ArtifactFilesIterator {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(file_path) = self.artifact_files.pop() {
            return Some(file_path);
        };

        let directory_to_search = self.directories_to_search.pop()?;
        let Ok(entries) = std::fs::read_dir(directory_to_search) else {
            return self.next();
        };

        for entry_path in entries.flatten().map(|entry| entry.path()) {
            if entry_path.is_dir() {
                self.directories_to_search.push(entry_path)
            } else if Self::is_artifact_file(&entry_path) {
                self.artifact_files.push(entry_path)
            }
        }

        self.next()
    }
}
