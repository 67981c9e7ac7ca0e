//! `git` command line backed repository and config

use super::{PushRequest, Repository};
use crate::config::{ConfigStore, ProjectConfigs};
use crate::error::{Error, Result};
use crate::types::{PendingBranch, Project, short_branch};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Prefix of refs recording what was last uploaded for review
const REFS_PUBLISHED: &str = "refs/published/";

/// Fallback when neither the remote HEAD nor a tracking branch is known
const DEFAULT_REVISION: &str = "master";

fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    debug!("git -C {} {}", dir.display(), args.join(" "));
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    } else {
        Err(Error::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// Like [`run_git`], but a failing command means "no value"
fn query_git(dir: &Path, args: &[&str]) -> Option<String> {
    run_git(dir, args).ok().filter(|s| !s.is_empty())
}

/// Repositories of a workspace, driven through `git`
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
    mock_push: bool,
}

impl GitRepository {
    /// Repositories below `root`; with `mock_push` pushes are only logged
    pub fn new(root: impl Into<PathBuf>, mock_push: bool) -> Self {
        Self {
            root: root.into(),
            mock_push,
        }
    }

    fn dir(&self, project: &Project) -> PathBuf {
        self.root.join(&project.path)
    }

    /// Describe the repository at `path` (relative to the root) as a project
    ///
    /// `remote` overrides the remote uploads go to; otherwise the remote
    /// tracked by the current branch is used, falling back to `origin`.
    pub fn discover_project(&self, path: &str, remote: Option<&str>) -> Result<Project> {
        let dir = self.root.join(path);
        run_git(&dir, &["rev-parse", "--git-dir"])?;

        let current = query_git(&dir, &["symbolic-ref", "-q", "--short", "HEAD"]);
        let remote_name = remote
            .map(ToString::to_string)
            .or_else(|| {
                current
                    .as_ref()
                    .and_then(|b| query_git(&dir, &["config", "--get", &format!("branch.{b}.remote")]))
            })
            .unwrap_or_else(|| "origin".to_string());

        let review_url = query_git(
            &dir,
            &["config", "--get", &format!("remote.{remote_name}.review")],
        )
        .unwrap_or_default();

        let revision = query_git(
            &dir,
            &["symbolic-ref", "-q", &format!("refs/remotes/{remote_name}/HEAD")],
        )
        .and_then(|r| {
            r.strip_prefix(&format!("refs/remotes/{remote_name}/"))
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| DEFAULT_REVISION.to_string());

        let name = query_git(&dir, &["rev-parse", "--show-toplevel"])
            .as_deref()
            .and_then(|top| Path::new(top).file_name())
            .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned());

        Ok(Project {
            name,
            path: path.to_string(),
            remote_name,
            review_url,
            revision,
        })
    }

    fn pending_branch(
        &self,
        project: &Project,
        branch: &str,
        head: &str,
    ) -> Result<Option<PendingBranch>> {
        let dir = self.dir(project);
        let tracking_branch =
            query_git(&dir, &["config", "--get", &format!("branch.{branch}.merge")]);
        let base = query_git(
            &dir,
            &["rev-parse", "--symbolic-full-name", &format!("{branch}@{{upstream}}")],
        )
        .unwrap_or_else(|| format!("refs/remotes/{}/{}", project.remote_name, project.revision));

        if query_git(&dir, &["rev-parse", "--verify", "-q", &base]).is_none() {
            debug!("skipping {branch}: no upstream {base}");
            return Ok(None);
        }

        let range = format!("{base}..refs/heads/{branch}");
        let log = run_git(&dir, &["log", "--format=%h %s", &range])?;
        let commits: Vec<String> = log.lines().map(ToString::to_string).collect();
        if commits.is_empty() {
            return Ok(None);
        }

        let published = query_git(
            &dir,
            &["rev-parse", "--verify", "-q", &format!("{REFS_PUBLISHED}{branch}")],
        )
        .is_some_and(|p| p == head);

        let destination = tracking_branch
            .as_deref()
            .map_or_else(|| project.revision.clone(), |t| short_branch(t).to_string());

        Ok(Some(PendingBranch {
            project: project.clone(),
            name: branch.to_string(),
            destination,
            tracking_branch,
            commits,
            published,
        }))
    }
}

impl Repository for GitRepository {
    fn resolve_revision(&self, project: &Project, revision: &str) -> Result<String> {
        run_git(
            &self.dir(project),
            &["rev-parse", "--verify", &format!("{revision}^{{commit}}")],
        )
    }

    fn pending_branches(
        &self,
        project: &Project,
        branch_filter: Option<&str>,
    ) -> Result<Vec<PendingBranch>> {
        let refs = run_git(
            &self.dir(project),
            &[
                "for-each-ref",
                "--format=%(refname:short) %(objectname)",
                "refs/heads/",
            ],
        )?;

        let mut pending = Vec::new();
        for line in refs.lines() {
            let Some((branch, head)) = line.split_once(' ') else {
                continue;
            };
            if branch_filter.is_some_and(|f| short_branch(f) != branch) {
                continue;
            }
            if let Some(p) = self.pending_branch(project, branch, head)? {
                pending.push(p);
            }
        }
        Ok(pending)
    }

    fn current_branch(&self, project: &Project) -> Result<Option<String>> {
        Ok(query_git(
            &self.dir(project),
            &["symbolic-ref", "-q", "--short", "HEAD"],
        ))
    }

    fn is_clean(&self, project: &Project) -> Result<bool> {
        let status = run_git(
            &self.dir(project),
            &["status", "--porcelain", "--untracked-files=no"],
        )?;
        Ok(status.is_empty())
    }

    fn push(&self, branch: &PendingBranch, request: &PushRequest) -> Result<()> {
        let mut args: Vec<String> = vec!["push".to_string()];
        for option in &request.spec.push_options {
            args.push("-o".to_string());
            args.push(option.clone());
        }
        args.push(branch.project.remote_name.clone());
        args.push(request.spec.refspec.clone());

        if self.mock_push {
            info!("mock git {}", args.join(" "));
            return Ok(());
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_git(&self.dir(&branch.project), &args)
            .map(|_| ())
            .map_err(|e| Error::Push(e.to_string()))?;

        // Remember what was uploaded so the next run knows it is published
        let head = format!("refs/heads/{}", branch.name);
        let published = format!("{REFS_PUBLISHED}{}", branch.name);
        if let Err(e) = run_git(&self.dir(&branch.project), &["update-ref", &published, &head]) {
            warn!("{} was uploaded but {published} was not updated: {e}", branch.name);
        }
        Ok(())
    }
}

/// Each project answers from its own repository's config
impl ProjectConfigs for GitRepository {
    fn config_for<'a>(&'a self, project: &Project) -> Box<dyn ConfigStore + 'a> {
        Box::new(GitConfig::new(self.dir(project)))
    }
}

/// Config store backed by `git config` in one repository
#[derive(Debug, Clone)]
pub struct GitConfig {
    dir: PathBuf,
}

impl GitConfig {
    /// Read and write the config of the repository at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ConfigStore for GitConfig {
    fn get(&self, key: &str) -> Option<String> {
        run_git(&self.dir, &["config", "--get", key]).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        run_git(&self.dir, &["config", key, value]).map(|_| ())
    }

    fn unset(&self, key: &str) -> Result<()> {
        run_git(&self.dir, &["config", "--unset", key]).map(|_| ())
    }

    fn save(&self) -> Result<()> {
        // `git config` writes through immediately
        Ok(())
    }
}
