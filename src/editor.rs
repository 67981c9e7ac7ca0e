//! Editing text in the operator's editor

use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Lets a human edit a text document
pub trait Editor: Send + Sync {
    /// Return the edited version of `text`
    fn edit(&self, text: &str) -> Result<String>;
}

/// Opens `$GIT_EDITOR`, `$VISUAL` or `$EDITOR` (falling back to `vi`) on a temporary file
#[derive(Debug, Clone, Default)]
pub struct ExternalEditor {
    command: Option<String>,
}

impl ExternalEditor {
    /// Use an explicit editor command instead of the environment
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
        }
    }

    fn command(&self) -> String {
        self.command
            .clone()
            .or_else(|| {
                ["GIT_EDITOR", "VISUAL", "EDITOR"]
                    .into_iter()
                    .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
            })
            .unwrap_or_else(|| "vi".to_string())
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, text: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("repo-upload-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        let editor = self.command();
        debug!("running editor: {editor} {}", file.path().display());

        // Run through the shell so editor commands may carry arguments
        let status = Command::new("sh")
            .arg("-c")
            .arg(format!("{editor} \"$@\""))
            .arg(&editor)
            .arg(file.path())
            .status()
            .map_err(|e| Error::Editor(format!("failed to run {editor}: {e}")))?;

        if !status.success() {
            return Err(Error::Editor(format!("{editor} exited with {status}")));
        }

        Ok(fs::read_to_string(file.path())?)
    }
}

/// Replaces the editor with the content of a prepared file
///
/// Used by `--mock-edit-script` to drive uploads without a terminal.
#[derive(Debug, Clone)]
pub struct ScriptFileEditor {
    path: PathBuf,
}

impl ScriptFileEditor {
    /// Return the content of `path` instead of editing
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Editor for ScriptFileEditor {
    fn edit(&self, text: &str) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(script) => Ok(script),
            Err(e) => {
                warn!("cannot read mock edit script {}: {e}", self.path.display());
                Ok(text.to_string())
            }
        }
    }
}
