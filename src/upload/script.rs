//! The edit script shown to the operator
//!
//! Step 1 of the script carries the review options, step 2 lists every
//! pending branch grouped by project. Branches left uncommented after
//! editing are uploaded.

use crate::config::UploadPolicy;
use crate::error::{Error, Result};
use crate::options::{OptionSet, OptionStore};
use crate::types::PendingBranch;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Line separating options from branch selection; must never change
pub const BRANCH_SELECTION_MARKER: &str = "# Step 2: Select project and branches for upload";

/// Commit summaries listed per branch before eliding the rest
const MAX_LISTED_COMMITS: usize = 10;

const RULER: &str =
    "##############################################################################";

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?\s*project\s*(\S+)/:$").expect("hardcoded project regex is valid")
});

static BRANCH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*branch\s*([^\s(]+)\s*\(.*").expect("hardcoded branch regex is valid")
});

/// Group branches by project path, projects sorted, branch order kept
pub fn group_by_project(branches: &[PendingBranch]) -> BTreeMap<String, Vec<PendingBranch>> {
    let mut groups: BTreeMap<String, Vec<PendingBranch>> = BTreeMap::new();
    for branch in branches {
        groups
            .entry(branch.project.path.clone())
            .or_default()
            .push(branch.clone());
    }
    groups
}

/// A rendered edit script and what is needed to read it back
#[derive(Debug, Clone)]
pub struct EditScript {
    /// Document handed to the editor
    pub text: String,
    /// Options file the edited options are saved to
    pub options_file: PathBuf,
    /// Whether every offered branch was published before
    pub published: bool,
    /// Options presented in step 1 (flags merged with the saved ones)
    pub options: OptionSet,
    /// Project name by project path
    projects: HashMap<String, String>,
    /// Offered branches by (project name, branch name)
    branches: HashMap<(String, String), PendingBranch>,
}

impl EditScript {
    /// Render the script for `candidates`
    ///
    /// `flags` are the command-line options; empty fields are filled from
    /// the options saved by the previous upload.
    pub fn build(
        candidates: &[PendingBranch],
        flags: &OptionSet,
        store: &OptionStore,
        policy: &UploadPolicy,
    ) -> Self {
        let groups = group_by_project(candidates);

        let single = groups.len() == 1 && groups.values().all(|b| b.len() == 1);
        let marker = if policy.assume_yes {
            " "
        } else if policy.assume_no {
            "#"
        } else if single {
            " "
        } else {
            "#"
        };

        let mut selection = vec![
            String::new(),
            RULER.to_string(),
            BRANCH_SELECTION_MARKER.to_string(),
            "#".to_string(),
            "# Note: Uncomment the branches to upload, and not touch the project lines".to_string(),
            RULER.to_string(),
            String::new(),
        ];

        let mut published = true;
        let mut first_destination: Option<String> = None;
        let mut projects = HashMap::new();
        let mut branches = HashMap::new();

        for (path, group) in &groups {
            selection.push("#".to_string());
            selection.push(format!("# project {path}/:"));

            for (i, branch) in group.iter().enumerate() {
                if i > 0 {
                    selection.push("#".to_string());
                }
                let destination = branch.destination_with(&flags.destination_branch);
                selection.push(format!(
                    "{marker}  branch {} ({:2} commit(s)) to remote branch {destination}:",
                    branch.name,
                    branch.commits.len()
                ));
                for commit in branch.commits.iter().take(MAX_LISTED_COMMITS) {
                    selection.push(format!("#         {commit}"));
                }
                if branch.commits.len() > MAX_LISTED_COMMITS {
                    selection.push("#         ... ...".to_string());
                }

                published &= branch.published;
                first_destination.get_or_insert(destination);
                projects.insert(path.clone(), branch.project.name.clone());
                branches.insert(
                    (branch.project.name.clone(), branch.name.clone()),
                    branch.clone(),
                );
            }
        }
        selection.push(String::new());

        let options_file = store.path_for_destination(&first_destination.unwrap_or_default());
        let mut options = flags.clone();
        options.fill_from(&store.load_prior(&options_file));

        let mut lines = step_one_banner(published);
        lines.extend(options.serialize(published));
        lines.extend(selection);

        Self {
            text: lines.join("\n"),
            options_file,
            published,
            options,
            projects,
            branches,
        }
    }

    /// Options after applying the step 1 part of the edited text
    pub fn parse_options(&self, edited: &str) -> OptionSet {
        let mut options = self.options.clone();
        let step_one = edited.split(BRANCH_SELECTION_MARKER).next().unwrap_or_default();
        options.parse(step_one);
        options
    }

    /// Branches left uncommented in the step 2 part of the edited text
    ///
    /// Project or branch lines that were never offered mean the script was
    /// damaged, and nothing is uploaded.
    pub fn parse_selection(&self, edited: &str) -> Result<Vec<PendingBranch>> {
        let mut in_selection = false;
        let mut project: Option<&str> = None;
        let mut selected = Vec::new();

        for line in edited.split('\n') {
            let line = line.trim_end_matches(['\r', ' ', '\t']);
            if !in_selection {
                in_selection = line == BRANCH_SELECTION_MARKER;
                continue;
            }

            if let Some(caps) = PROJECT_LINE.captures(line) {
                let path = &caps[1];
                let name = self.projects.get(path).ok_or_else(|| {
                    Error::ScriptCorruption(format!("project {path} not available for upload"))
                })?;
                project = Some(name);
                continue;
            }

            if let Some(caps) = BRANCH_LINE.captures(line) {
                let name = &caps[1];
                let Some(project) = project else {
                    return Err(Error::ScriptCorruption(format!(
                        "project for branch {name} not in script"
                    )));
                };
                let branch = self
                    .branches
                    .get(&(project.to_string(), name.to_string()))
                    .ok_or_else(|| {
                        Error::ScriptCorruption(format!("branch {name} not in {project}"))
                    })?;
                selected.push(branch.clone());
            }
        }

        if selected.is_empty() {
            return Err(Error::NothingSelected);
        }
        Ok(selected)
    }
}

fn step_one_banner(published: bool) -> Vec<String> {
    let mut banner = vec![
        RULER.to_string(),
        "# Step 1: Input your options for code review".to_string(),
        "#".to_string(),
    ];
    if published {
        banner.push(
            "# Note: Input your options below the comments and keep the comments unchanged,"
                .to_string(),
        );
        banner.push(
            "#       and options which work only for new created code review are hidden."
                .to_string(),
        );
    } else {
        banner.push(
            "# Note: Input your options below the comments and keep the comments unchanged"
                .to_string(),
        );
    }
    banner.push(RULER.to_string());
    banner.push(String::new());
    banner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Project;
    use tempfile::TempDir;

    fn project(name: &str, path: &str) -> Project {
        Project {
            name: name.to_string(),
            path: path.to_string(),
            remote_name: "origin".to_string(),
            review_url: "https://review.example.com".to_string(),
            revision: "main".to_string(),
        }
    }

    fn branch(project: &Project, name: &str, commits: usize) -> PendingBranch {
        PendingBranch {
            project: project.clone(),
            name: name.to_string(),
            destination: "refs/heads/main".to_string(),
            tracking_branch: Some("refs/heads/main".to_string()),
            commits: (0..commits).map(|i| format!("abc{i:04} change {i}")).collect(),
            published: false,
        }
    }

    fn build(candidates: &[PendingBranch]) -> (EditScript, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = OptionStore::new(dir.path());
        let script = EditScript::build(
            candidates,
            &OptionSet::default(),
            &store,
            &UploadPolicy::default(),
        );
        (script, dir)
    }

    #[test]
    fn test_single_branch_preselected() {
        let p = project("platform/app", "app");
        let (script, _dir) = build(&[branch(&p, "topic", 2)]);

        assert!(script.text.contains(
            "\n   branch topic ( 2 commit(s)) to remote branch refs/heads/main:\n"
        ));
        assert!(script.text.contains("\n# project app/:\n"));

        let selected = script.parse_selection(&script.text).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "topic");
    }

    #[test]
    fn test_many_branches_start_commented() {
        let app = project("platform/app", "app");
        let lib = project("platform/lib", "lib");
        let (script, _dir) = build(&[branch(&lib, "b1", 1), branch(&app, "b2", 1)]);

        assert!(script.text.contains("#  branch b1 ( 1 commit(s))"));
        assert!(script.text.contains("#  branch b2 ( 1 commit(s))"));
        // Projects sorted by path
        let app_at = script.text.find("# project app/:").unwrap();
        let lib_at = script.text.find("# project lib/:").unwrap();
        assert!(app_at < lib_at);

        assert!(matches!(
            script.parse_selection(&script.text),
            Err(Error::NothingSelected)
        ));
    }

    #[test]
    fn test_only_uncommented_branches_selected() {
        let p = project("platform/app", "app");
        let (script, _dir) = build(&[branch(&p, "b1", 1), branch(&p, "b2", 1)]);

        let edited = script
            .text
            .replace("#  branch b1 (", "   branch b1 (");
        let selected = script.parse_selection(&edited).unwrap();

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "b1");
    }

    #[test]
    fn test_assume_policies_override_marker() {
        let p = project("platform/app", "app");
        let dir = TempDir::new().unwrap();
        let store = OptionStore::new(dir.path());
        let candidates = [branch(&p, "b1", 1), branch(&p, "b2", 1)];

        let yes = UploadPolicy {
            assume_yes: true,
            ..UploadPolicy::default()
        };
        let script = EditScript::build(&candidates, &OptionSet::default(), &store, &yes);
        assert_eq!(script.parse_selection(&script.text).unwrap().len(), 2);

        let no = UploadPolicy {
            assume_no: true,
            ..UploadPolicy::default()
        };
        let script = EditScript::build(&candidates[..1], &OptionSet::default(), &store, &no);
        assert!(script.text.contains("#  branch b1 ("));
    }

    #[test]
    fn test_long_commit_list_elided() {
        let p = project("platform/app", "app");
        let (script, _dir) = build(&[branch(&p, "big", 12)]);

        assert!(script.text.contains("(12 commit(s))"));
        assert!(script.text.contains("#         abc0009 change 9\n"));
        assert!(!script.text.contains("change 10"));
        assert!(script.text.contains("#         ... ...\n"));
    }

    #[test]
    fn test_unknown_project_is_corruption() {
        let p = project("platform/app", "app");
        let (script, _dir) = build(&[branch(&p, "topic", 1)]);

        let edited = script.text.replace("# project app/:", "# project other/:");
        let err = script.parse_selection(&edited).unwrap_err();
        assert!(matches!(err, Error::ScriptCorruption(ref m) if m.contains("other")));
    }

    #[test]
    fn test_unknown_branch_is_corruption() {
        let p = project("platform/app", "app");
        let (script, _dir) = build(&[branch(&p, "topic", 1)]);

        let edited = script.text.replace("branch topic (", "branch renamed (");
        assert!(matches!(
            script.parse_selection(&edited),
            Err(Error::ScriptCorruption(_))
        ));
    }

    #[test]
    fn test_branch_before_project_is_corruption() {
        let p = project("platform/app", "app");
        let (script, _dir) = build(&[branch(&p, "topic", 1)]);

        let edited = format!("{BRANCH_SELECTION_MARKER}\n  branch topic ( 1 commit(s)):\n");
        assert!(matches!(
            script.parse_selection(&edited),
            Err(Error::ScriptCorruption(_))
        ));
    }

    #[test]
    fn test_lines_before_marker_never_select() {
        let p = project("platform/app", "app");
        let (script, _dir) = build(&[branch(&p, "topic", 1)]);

        let edited = "# project app/:\n  branch topic ( 1 commit(s)):\n";
        assert!(matches!(
            script.parse_selection(edited),
            Err(Error::NothingSelected)
        ));
    }

    #[test]
    fn test_published_hides_title() {
        let p = project("platform/app", "app");
        let mut b = branch(&p, "topic", 1);
        b.published = true;
        let (script, _dir) = build(&[b.clone()]);
        assert!(script.published);
        assert!(!script.text.contains("[Title]"));

        let (script, _dir) = build(&[b, branch(&p, "fresh", 1)]);
        assert!(!script.published);
        assert!(script.text.contains("[Title]"));
    }

    #[test]
    fn test_options_file_from_first_destination() {
        let p = project("platform/app", "app");
        let mut b = branch(&p, "topic", 1);
        b.destination = "refs/heads/release/2.0".to_string();
        let (script, dir) = build(&[b]);

        assert_eq!(
            script.options_file,
            dir.path().join("UPLOAD_OPTIONS.d").join("release.2.0")
        );
    }

    #[test]
    fn test_options_merged_and_edited() {
        let p = project("platform/app", "app");
        let dir = TempDir::new().unwrap();
        let store = OptionStore::new(dir.path());
        let saved = OptionSet {
            title: "Saved title".to_string(),
            reviewers: vec!["saved-reviewer".to_string()],
            ..OptionSet::default()
        };
        store
            .save(&store.path_for_destination("main"), &saved)
            .unwrap();
        let flags = OptionSet {
            reviewers: vec!["flag-reviewer".to_string()],
            ..OptionSet::default()
        };

        let script = EditScript::build(
            &[branch(&p, "topic", 1)],
            &flags,
            &store,
            &UploadPolicy::default(),
        );
        assert!(script.text.contains("\nSaved title\n"));
        assert!(script.text.contains("\nflag-reviewer\n"));
        assert!(!script.text.contains("saved-reviewer"));

        let edited = script.text.replace("\nSaved title\n", "\nEdited title\n");
        let options = script.parse_options(&edited);
        assert_eq!(options.title, "Edited title");
        assert_eq!(options.reviewers, vec!["flag-reviewer"]);
    }
}
