//! repo-upload - upload local branches for code review
//!
//! CLI binary for pushing branches of one or more git projects to Gerrit,
//! AGit or plain git remotes.

use anyhow::Result;
use clap::Parser;
use repo_upload::options::OptionSet;
use repo_upload::upload::BranchFilter;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;

#[derive(Parser)]
#[command(name = "repo-upload")]
#[command(about = "Upload local branches for code review")]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Projects to upload from, relative to the current directory
    project_paths: Vec<String>,

    /// Upload only this branch
    #[arg(long = "br", value_name = "BRANCH")]
    branch: Option<String>,

    /// Upload only the current branch
    #[arg(long = "cbr", conflicts_with = "branch")]
    current_branch: bool,

    /// Request reviews from these people (comma separated)
    #[arg(long = "re", visible_alias = "reviewers", value_name = "REVIEWERS")]
    reviewers: Vec<String>,

    /// Also send email to these people (comma separated)
    #[arg(long, value_name = "CC")]
    cc: Vec<String>,

    /// Title of the review
    #[arg(long)]
    title: Option<String>,

    /// Description of the review
    #[arg(long)]
    description: Option<String>,

    /// Issue IDs to cross reference
    #[arg(long)]
    issue: Option<String>,

    /// Upload as a draft
    #[arg(short, long)]
    draft: bool,

    /// Upload as a private change
    #[arg(short, long)]
    private: bool,

    /// Upload as work in progress
    #[arg(short, long)]
    wip: bool,

    /// Additional push options to transmit
    #[arg(short = 'o', long = "push-option", value_name = "OPTION")]
    push_options: Vec<String>,

    /// Submit for review on this target branch
    #[arg(short = 'D', long = "dest", value_name = "BRANCH")]
    dest: Option<String>,

    /// Git remote to push to
    #[arg(long)]
    remote: Option<String>,

    /// Confirm a single branch instead of opening the editor
    #[arg(long)]
    no_edit: bool,

    /// Do not send notification emails
    #[arg(long)]
    no_emails: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    no_cert_checks: bool,

    /// Classify remotes again instead of using cached answers
    #[arg(long)]
    no_cache: bool,

    /// Send local branch name as the review topic
    #[arg(short = 't', long, hide = true)]
    auto_topic: bool,

    /// Read the edited script from this file instead of running an editor
    #[arg(long, hide = true, value_name = "FILE")]
    mock_edit_script: Option<PathBuf>,

    /// Log the push instead of running it
    #[arg(long, hide = true)]
    mock_git_push: bool,

    /// Directory holding saved upload options (defaults to .git)
    #[arg(long, value_name = "DIR")]
    admin_dir: Option<PathBuf>,

    /// Answer yes to every question
    #[arg(short, long, conflicts_with = "no")]
    yes: bool,

    /// Answer no to every question
    #[arg(short, long)]
    no: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_args(self) -> cli::UploadArgs {
        let filter = match (self.branch, self.current_branch) {
            (Some(name), _) => BranchFilter::Named(name),
            (None, true) => BranchFilter::Current,
            (None, false) => BranchFilter::All,
        };
        let options = OptionSet {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            issue: self.issue.unwrap_or_default(),
            reviewers: self.reviewers,
            watchers: self.cc,
            draft: self.draft,
            private: self.private,
            work_in_progress: self.wip,
            destination_branch: self.dest.unwrap_or_default(),
            push_options: self.push_options,
            auto_topic: self.auto_topic,
            no_emails: self.no_emails,
            no_cert_checks: self.no_cert_checks,
        };

        cli::UploadArgs {
            project_paths: self.project_paths,
            filter,
            options,
            remote: self.remote,
            no_edit: self.no_edit,
            no_cache: self.no_cache,
            mock_edit_script: self.mock_edit_script,
            mock_git_push: self.mock_git_push,
            admin_dir: self.admin_dir,
            assume_yes: self.yes,
            assume_no: self.no,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose lowers the default to DEBUG
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .try_init();

    cli::run_upload_command(Path::new("."), cli.into_args()).await?;
    Ok(())
}
