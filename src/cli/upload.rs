//! Upload command - push local branches for code review

use crate::cli::progress::CliProgress;
use crate::cli::style::Stylize;
use anstream::{eprintln, println};
use repo_upload::config::UploadPolicy;
use repo_upload::editor::{Editor, ExternalEditor, ScriptFileEditor};
use repo_upload::error::{Error, Result};
use repo_upload::options::{OptionSet, OptionStore};
use repo_upload::prompt::TerminalPrompter;
use repo_upload::remote::{RemoteClassifier, RemoteRegistry};
use repo_upload::repo::GitRepository;
use repo_upload::upload::{
    BranchFilter, Phase, ProgressCallback, UploadContext, collect_candidates, run_upload,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything the upload command needs from the command line
#[derive(Debug, Default)]
pub struct UploadArgs {
    pub project_paths: Vec<String>,
    pub filter: BranchFilter,
    pub options: OptionSet,
    pub remote: Option<String>,
    pub no_edit: bool,
    pub no_cache: bool,
    pub mock_edit_script: Option<PathBuf>,
    pub mock_git_push: bool,
    pub admin_dir: Option<PathBuf>,
    pub assume_yes: bool,
    pub assume_no: bool,
}

/// Run the upload command in the workspace at `root`
pub async fn run_upload_command(root: &Path, args: UploadArgs) -> Result<()> {
    let mut policy = UploadPolicy::from_env();
    policy.assume_yes |= args.assume_yes;
    policy.assume_no |= args.assume_no;
    policy.no_cert_checks |= args.options.no_cert_checks;

    let repo = GitRepository::new(root, args.mock_git_push);
    let paths = if args.project_paths.is_empty() {
        vec![".".to_string()]
    } else {
        args.project_paths
    };
    let projects = paths
        .iter()
        .map(|p| repo.discover_project(p, args.remote.as_deref()))
        .collect::<Result<Vec<_>>>()?;

    let progress = CliProgress::new();
    progress.on_phase(Phase::Collecting).await;
    let candidates = collect_candidates(&repo, &projects, &args.filter)?;
    if candidates.is_empty() {
        eprintln!("{}", "no branches ready for upload".warn());
        return Ok(());
    }
    debug!("{} candidate branch(es)", candidates.len());

    let editor: Box<dyn Editor> = match args.mock_edit_script {
        Some(path) => Box::new(ScriptFileEditor::new(path)),
        None => Box::new(ExternalEditor::default()),
    };
    let admin_dir = args.admin_dir.unwrap_or_else(|| root.join(".git"));
    let store = OptionStore::new(admin_dir);
    let registry = RemoteRegistry::new(RemoteClassifier::new(policy.clone())?, args.no_cache);

    let ctx = UploadContext {
        repo: &repo,
        config: &repo,
        editor: editor.as_ref(),
        prompter: &TerminalPrompter,
        store: &store,
        registry: &registry,
        policy: &policy,
        progress: &progress,
    };
    let report = run_upload(&candidates, args.options, args.no_edit, &ctx).await?;

    eprintln!();
    eprintln!("{}", "-".repeat(70));
    if report.has_errors() {
        for outcome in report.failures() {
            if let Some(line) = outcome.failure_line() {
                eprintln!("{}", line.error());
            }
        }
        eprintln!();
        return Err(Error::UploadFailed(report.failures().count()));
    }

    println!(
        "{}",
        format!("{} branch(es) uploaded", report.uploaded_count()).success()
    );
    Ok(())
}
