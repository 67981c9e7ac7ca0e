//! CLI commands
//!
//! Command implementations for the `repo-upload` binary.

mod progress;
pub mod style;
mod upload;

pub use upload::{UploadArgs, run_upload_command};
