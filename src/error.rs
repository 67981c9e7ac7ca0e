//! Error types for repo-upload

use thiserror::Error;

/// Errors produced by the upload workflow
#[derive(Error, Debug)]
pub enum Error {
    /// The operator declined a confirmation prompt
    #[error("upload aborted by user")]
    UserAborted,

    /// A configuration switch forbids the upload
    #[error("upload blocked by {key} = false")]
    PolicyBlocked {
        /// Config key that blocked the upload
        key: String,
    },

    /// The edited script references projects or branches that were never offered
    #[error("{0}")]
    ScriptCorruption(String),

    /// No branch was left uncommented in the edited script
    #[error("nothing uncommented for upload")]
    NothingSelected,

    /// Upload options could not be saved
    #[error("cannot save upload options to {path}: {source}")]
    Persistence {
        /// Options file that failed to save
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Push of a single branch failed
    #[error("{0}")]
    Push(String),

    /// Destination branch does not match the branch's tracking branch
    #[error("merge branch {merge} does not match destination branch {dest}")]
    DestinationMismatch {
        /// Tracking merge ref of the local branch
        merge: String,
        /// Destination ref the upload would target
        dest: String,
    },

    /// Git command failed
    #[error("git error: {0}")]
    Git(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Editor invocation failed
    #[error("editor error: {0}")]
    Editor(String),

    /// Console prompt failed
    #[error("prompt error: {0}")]
    Prompt(String),

    /// One or more branches failed to upload
    #[error("{0} branch(es) failed to upload")]
    UploadFailed(usize),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure talking to the review server
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for repo-upload
pub type Result<T> = std::result::Result<T, Error>;
