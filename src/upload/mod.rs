//! Upload workflow
//!
//! 1. Collection - find branches with commits not yet uploaded
//! 2. Selection - confirm a single branch or edit a script for many
//! 3. Execution - classify each remote and push with the matching transport

mod collect;
mod execute;
mod progress;
mod script;

pub use collect::{
    BranchCollector, ConfirmCollector, EditorCollector, Selection, UNUSUAL_COMMIT_THRESHOLD,
};
pub use execute::{BranchOutcome, UploadReport, execute_upload};
pub use progress::{NoopProgress, Phase, ProgressCallback};
pub use script::{BRANCH_SELECTION_MARKER, EditScript, group_by_project};

use crate::config::{ProjectConfigs, UploadPolicy};
use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::options::{OptionSet, OptionStore};
use crate::prompt::Prompter;
use crate::remote::RemoteRegistry;
use crate::repo::Repository;
use crate::types::{PendingBranch, Project};
use tracing::debug;

/// Collaborators an upload run works with
#[allow(missing_docs)]
pub struct UploadContext<'a> {
    pub repo: &'a dyn Repository,
    pub config: &'a dyn ProjectConfigs,
    pub editor: &'a dyn Editor,
    pub prompter: &'a dyn Prompter,
    pub store: &'a OptionStore,
    pub registry: &'a RemoteRegistry,
    pub policy: &'a UploadPolicy,
    pub progress: &'a dyn ProgressCallback,
}

/// Which local branches are considered
#[derive(Debug, Clone, Default)]
pub enum BranchFilter {
    /// Every branch with pending commits
    #[default]
    All,
    /// Only the named branch
    Named(String),
    /// Only the branch checked out in each project
    Current,
}

/// Pending branches of `projects`, in project order
pub fn collect_candidates(
    repo: &dyn Repository,
    projects: &[Project],
    filter: &BranchFilter,
) -> Result<Vec<PendingBranch>> {
    let mut candidates = Vec::new();
    for project in projects {
        let name = match filter {
            BranchFilter::All => None,
            BranchFilter::Named(name) => Some(name.clone()),
            BranchFilter::Current => match repo.current_branch(project)? {
                Some(current) => Some(current),
                None => {
                    debug!("{} has no current branch", project.path);
                    continue;
                }
            },
        };
        candidates.extend(repo.pending_branches(project, name.as_deref())?);
    }
    Ok(candidates)
}

/// Select and upload branches out of `candidates`
///
/// `no_edit` confirms a lone branch on the console instead of opening the
/// editor. A declined or blocked confirmation is reported as a failed
/// branch; a damaged or empty edit script fails the whole run.
pub async fn run_upload(
    candidates: &[PendingBranch],
    flags: OptionSet,
    no_edit: bool,
    ctx: &UploadContext<'_>,
) -> Result<UploadReport> {
    if candidates.is_empty() {
        return Ok(UploadReport::default());
    }

    ctx.progress.on_phase(Phase::Selecting).await;
    let selection = if no_edit && candidates.len() == 1 {
        let config = ctx.config.config_for(&candidates[0].project);
        let collector = ConfirmCollector::new(config.as_ref(), ctx.prompter, ctx.policy);
        match collector.collect(candidates, flags.clone()) {
            Ok(selection) => selection,
            Err(e @ (Error::UserAborted | Error::PolicyBlocked { .. })) => {
                let branch = &candidates[0];
                let destination = branch.destination_with(&flags.destination_branch);
                ctx.progress.on_failed(branch, &e.to_string()).await;
                let mut report = UploadReport::default();
                report.record_failure(branch, destination, &e);
                return Ok(report);
            }
            Err(e) => return Err(e),
        }
    } else {
        EditorCollector::new(ctx.editor, ctx.store, ctx.policy).collect(candidates, flags)?
    };

    debug!("{} branch(es) selected", selection.branches.len());
    Ok(execute_upload(&selection, ctx).await)
}
