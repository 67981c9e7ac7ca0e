//! Progress callback trait for interface-agnostic updates
//!
//! The CLI implements this to print what happens while branches are
//! uploaded; tests use [`NoopProgress`] or record the events.

use crate::types::{PendingBranch, RemoteClassification};
use async_trait::async_trait;

/// Upload phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Looking for branches with commits to upload
    Collecting,
    /// Asking the operator which branches to upload
    Selecting,
    /// Probing review servers
    Classifying,
    /// Pushing branches
    Pushing,
    /// Upload complete
    Complete,
}

/// Progress callback trait
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called once a remote has been classified
    async fn on_classified(&self, branch: &PendingBranch, classification: &RemoteClassification);

    /// Called when a branch was pushed
    async fn on_uploaded(&self, branch: &PendingBranch, destination: &str);

    /// Called when a branch could not be uploaded (non-fatal)
    async fn on_failed(&self, branch: &PendingBranch, error: &str);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_classified(&self, _branch: &PendingBranch, _c: &RemoteClassification) {}
    async fn on_uploaded(&self, _branch: &PendingBranch, _destination: &str) {}
    async fn on_failed(&self, _branch: &PendingBranch, _error: &str) {}
    async fn on_message(&self, _message: &str) {}
}
