//! Pushing the selected branches
//!
//! Branches are pushed one after another. A failing branch is recorded in
//! the [`UploadReport`] and the remaining branches still go out.

use super::{Selection, UploadContext};
use super::progress::Phase;
use crate::config::{autoupload_key, uploadtopic_key};
use crate::error::{Error, Result};
use crate::prompt::confirm;
use crate::remote::{PushTarget, Transport};
use crate::repo::PushRequest;
use crate::types::{PendingBranch, full_branch};
use tracing::{error, info, warn};

/// Errors longer than this go on their own line in the report
const INLINE_ERROR_WIDTH: usize = 30;

/// What happened to one branch
#[derive(Debug, Clone)]
pub struct BranchOutcome {
    /// The branch
    pub branch: PendingBranch,
    /// Destination it was (or would have been) pushed to
    pub destination: String,
    /// Error message when the branch was not uploaded
    pub error: Option<String>,
}

impl BranchOutcome {
    /// Whether the push went through
    pub fn uploaded(&self) -> bool {
        self.error.is_none()
    }

    /// Report line for a failed branch
    pub fn failure_line(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        let project = format!("{}/", self.branch.project.path);
        let detail = if error.len() <= INLINE_ERROR_WIDTH {
            format!(" ({error})")
        } else {
            format!("\n       ({error})")
        };
        Some(format!(
            "[FAILED] {project:<15} {:<15}{detail}",
            self.branch.name
        ))
    }
}

/// Result of an upload run
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    /// One entry per selected branch, in push order
    pub outcomes: Vec<BranchOutcome>,
}

impl UploadReport {
    /// Whether any branch failed
    pub fn has_errors(&self) -> bool {
        self.outcomes.iter().any(|o| !o.uploaded())
    }

    /// Failed branches
    pub fn failures(&self) -> impl Iterator<Item = &BranchOutcome> {
        self.outcomes.iter().filter(|o| !o.uploaded())
    }

    /// Number of uploaded branches
    pub fn uploaded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.uploaded()).count()
    }

    pub(crate) fn record_failure(
        &mut self,
        branch: &PendingBranch,
        destination: String,
        error: &Error,
    ) {
        self.outcomes.push(BranchOutcome {
            branch: branch.clone(),
            destination,
            error: Some(error.to_string()),
        });
    }
}

/// Push every selected branch
pub async fn execute_upload(selection: &Selection, ctx: &UploadContext<'_>) -> UploadReport {
    let options = &selection.options;
    let reviewers = options.reviewer_list();
    let watchers = options.watcher_list();
    let mut report = UploadReport::default();

    ctx.progress.on_phase(Phase::Pushing).await;

    for branch in &selection.branches {
        let destination = branch.destination_with(&options.destination_branch);
        let result =
            upload_branch(branch, &destination, selection, &reviewers, &watchers, ctx).await;

        match result {
            Ok(()) => {
                info!("uploaded {} to {destination}", branch.name);
                ctx.progress.on_uploaded(branch, &destination).await;
                report.outcomes.push(BranchOutcome {
                    branch: branch.clone(),
                    destination,
                    error: None,
                });
            }
            Err(e) => {
                warn!("upload of {} failed: {e}", branch.name);
                ctx.progress.on_failed(branch, &e.to_string()).await;
                report.record_failure(branch, destination, &e);
            }
        }
    }

    ctx.progress.on_phase(Phase::Complete).await;
    report
}

async fn upload_branch(
    branch: &PendingBranch,
    destination: &str,
    selection: &Selection,
    reviewers: &[String],
    watchers: &[String],
    ctx: &UploadContext<'_>,
) -> Result<()> {
    let project = &branch.project;
    let mut options = selection.options.clone();
    let config = ctx.config.config_for(project);

    if !ctx.repo.is_clean(project)? && !config.has_key(&autoupload_key(&project.review_url)) {
        ctx.prompter.say(&format!(
            "Uncommitted changes in {} (did you forget to amend?):",
            project.name
        ));
        if !confirm(ctx.prompter, ctx.policy, "Continue uploading? (y/N) ")? {
            ctx.progress
                .on_message(&format!("skipping upload of {}", branch.name))
                .await;
            return Err(Error::UserAborted);
        }
    }

    if !options.auto_topic {
        options.auto_topic = config.get_bool(&uploadtopic_key(&project.review_url), false);
    }

    if options.destination_branch.is_empty() {
        if let Some(merge) = &branch.tracking_branch {
            let merge = full_branch(merge);
            let dest = full_branch(destination);
            if merge != dest {
                error!("merge branch {merge} does not match destination branch {dest}");
                error!("Please use `--dest {destination}` if this is intentional");
                return Err(Error::DestinationMismatch { merge, dest });
            }
        }
    }

    ctx.progress.on_phase(Phase::Classifying).await;
    let classification = ctx.registry.classify(project, config.as_ref()).await?;
    ctx.progress.on_classified(branch, &classification).await;

    let spec = Transport::for_remote(classification.remote_type).push_spec(&PushTarget {
        local_branch: &branch.name,
        destination,
        options: &options,
        reviewers,
        watchers,
    });

    let request = PushRequest {
        destination: destination.to_string(),
        classification,
        spec,
        options,
        reviewers: reviewers.to_vec(),
        watchers: watchers.to_vec(),
    };
    ctx.repo.push(branch, &request)
}
