//! Version-control operations used by uploads
//!
//! The upload workflow only talks to repositories through [`Repository`];
//! [`GitRepository`] implements it on top of the `git` command line.

mod git;

pub use git::{GitConfig, GitRepository};

use crate::error::Result;
use crate::options::OptionSet;
use crate::remote::PushSpec;
use crate::types::{PendingBranch, Project, RemoteClassification};

/// A push of one branch for review
#[derive(Debug, Clone)]
pub struct PushRequest {
    /// Destination branch on the remote
    pub destination: String,
    /// Review server the push goes to
    pub classification: RemoteClassification,
    /// Refspec and push options
    pub spec: PushSpec,
    /// Review metadata
    pub options: OptionSet,
    /// Reviewers after splitting
    pub reviewers: Vec<String>,
    /// Watchers after splitting
    pub watchers: Vec<String>,
}

/// Repository operations needed by the upload workflow
pub trait Repository: Send + Sync {
    /// Resolve a revision to a commit id
    fn resolve_revision(&self, project: &Project, revision: &str) -> Result<String>;

    /// Branches of `project` with commits not yet uploaded
    ///
    /// `branch_filter` limits the result to one branch name.
    fn pending_branches(
        &self,
        project: &Project,
        branch_filter: Option<&str>,
    ) -> Result<Vec<PendingBranch>>;

    /// Currently checked out branch, `None` when detached
    fn current_branch(&self, project: &Project) -> Result<Option<String>>;

    /// Whether the work tree has no uncommitted changes
    fn is_clean(&self, project: &Project) -> Result<bool>;

    /// Push a branch for review
    fn push(&self, branch: &PendingBranch, request: &PushRequest) -> Result<()>;
}
