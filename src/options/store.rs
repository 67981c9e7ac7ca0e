//! Persistence of upload options between uploads

use super::OptionSet;
use crate::error::{Error, Result};
use crate::types::short_branch;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options shared by all destination branches
pub const UPLOAD_OPTIONS_FILE: &str = "UPLOAD_OPTIONS";

/// Directory holding one options file per destination branch
pub const UPLOAD_OPTIONS_DIR: &str = "UPLOAD_OPTIONS.d";

const LOCK_SUFFIX: &str = ".lock";

/// Reads and writes options files under a workspace admin directory
#[derive(Debug, Clone)]
pub struct OptionStore {
    admin_dir: PathBuf,
}

impl OptionStore {
    /// Create a store rooted at the workspace admin directory
    pub fn new(admin_dir: impl Into<PathBuf>) -> Self {
        Self {
            admin_dir: admin_dir.into(),
        }
    }

    /// Options file for a destination branch
    ///
    /// `refs/heads/release/1.0` maps to `UPLOAD_OPTIONS.d/release.1.0`.
    pub fn path_for_destination(&self, destination: &str) -> PathBuf {
        let name = short_branch(destination).replace('/', ".");
        self.admin_dir.join(UPLOAD_OPTIONS_DIR).join(name)
    }

    /// Load options from a file; a missing or unreadable file yields defaults
    pub fn load(path: &Path) -> OptionSet {
        let mut options = OptionSet::default();
        match fs::read_to_string(path) {
            Ok(text) => options.parse(&text),
            Err(e) => debug!("no upload options at {}: {e}", path.display()),
        }
        options
    }

    /// Load the options saved by a previous upload
    ///
    /// Tries the file of the destination branch, then the shared
    /// `UPLOAD_OPTIONS` file, then the first file saved for any other branch.
    pub fn load_prior(&self, path: &Path) -> OptionSet {
        self.resolve_prior(path)
            .map(|p| Self::load(&p))
            .unwrap_or_default()
    }

    fn resolve_prior(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }

        let shared = self.admin_dir.join(UPLOAD_OPTIONS_FILE);
        if shared.is_file() {
            return Some(shared);
        }

        let entries = fs::read_dir(self.admin_dir.join(UPLOAD_OPTIONS_DIR)).ok()?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| !p.to_string_lossy().ends_with(LOCK_SUFFIX))
            .collect();
        files.sort();
        files.into_iter().next()
    }

    /// Save options for the next upload
    ///
    /// A title or description already saved at `path` wins over the
    /// in-memory one, so hand-edited values survive batch uploads.
    pub fn save(&self, path: &Path, options: &OptionSet) -> Result<()> {
        let lock = Self::stage(path, options)?;
        fs::rename(&lock, path).map_err(|source| persistence(path, source))?;
        debug!("saved upload options to {}", path.display());
        Ok(())
    }

    /// Write the complete document to `<path>.lock`
    fn stage(path: &Path, options: &OptionSet) -> Result<PathBuf> {
        let mut options = options.clone();

        if path.exists() {
            let saved = Self::load(path);
            if !saved.title.is_empty() {
                options.title = saved.title;
            }
            if !saved.description.is_empty() {
                options.description = saved.description;
            }
        } else if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| persistence(path, source))?;
        }

        let mut lock = path.as_os_str().to_owned();
        lock.push(LOCK_SUFFIX);
        let lock = PathBuf::from(lock);

        fs::write(&lock, options.serialize(false).join("\n"))
            .map_err(|source| persistence(path, source))?;
        Ok(lock)
    }
}

fn persistence(path: &Path, source: std::io::Error) -> Error {
    Error::Persistence {
        path: path.display().to_string(),
        source,
    }
}
