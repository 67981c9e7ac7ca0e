//! Mock repository, prompter and editor for upload tests
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use repo_upload::editor::Editor;
use repo_upload::error::{Error, Result};
use repo_upload::prompt::Prompter;
use repo_upload::repo::{PushRequest, Repository};
use repo_upload::types::{PendingBranch, Project};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Call record for `push`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushCall {
    pub project: String,
    pub branch: String,
    pub destination: String,
    pub refspec: String,
    pub push_options: Vec<String>,
}

/// Repository returning canned branches and recording pushes
///
/// Features:
/// - Pending branches per project path
/// - Dirty work trees per project path
/// - Error injection per branch name
#[derive(Default)]
pub struct MockRepository {
    branches: Mutex<HashMap<String, Vec<PendingBranch>>>,
    current: Mutex<HashMap<String, String>>,
    dirty: Mutex<HashSet<String>>,
    fail_push: Mutex<HashMap<String, String>>,
    push_calls: Mutex<Vec<PushCall>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branches(branches: &[PendingBranch]) -> Self {
        let repo = Self::new();
        for branch in branches {
            repo.add_branch(branch.clone());
        }
        repo
    }

    pub fn add_branch(&self, branch: PendingBranch) {
        self.branches
            .lock()
            .unwrap()
            .entry(branch.project.path.clone())
            .or_default()
            .push(branch);
    }

    pub fn set_current(&self, project_path: &str, branch: &str) {
        self.current
            .lock()
            .unwrap()
            .insert(project_path.to_string(), branch.to_string());
    }

    pub fn set_dirty(&self, project_path: &str) {
        self.dirty.lock().unwrap().insert(project_path.to_string());
    }

    pub fn fail_push_of(&self, branch: &str, message: &str) {
        self.fail_push
            .lock()
            .unwrap()
            .insert(branch.to_string(), message.to_string());
    }

    pub fn push_calls(&self) -> Vec<PushCall> {
        self.push_calls.lock().unwrap().clone()
    }

    pub fn pushed_branches(&self) -> Vec<String> {
        self.push_calls().into_iter().map(|c| c.branch).collect()
    }
}

impl Repository for MockRepository {
    fn resolve_revision(&self, _project: &Project, revision: &str) -> Result<String> {
        Ok(format!("{revision}_commit"))
    }

    fn pending_branches(
        &self,
        project: &Project,
        branch_filter: Option<&str>,
    ) -> Result<Vec<PendingBranch>> {
        let branches = self.branches.lock().unwrap();
        Ok(branches
            .get(&project.path)
            .into_iter()
            .flatten()
            .filter(|b| branch_filter.is_none_or(|f| f == b.name))
            .cloned()
            .collect())
    }

    fn current_branch(&self, project: &Project) -> Result<Option<String>> {
        Ok(self.current.lock().unwrap().get(&project.path).cloned())
    }

    fn is_clean(&self, project: &Project) -> Result<bool> {
        Ok(!self.dirty.lock().unwrap().contains(&project.path))
    }

    fn push(&self, branch: &PendingBranch, request: &PushRequest) -> Result<()> {
        if let Some(message) = self.fail_push.lock().unwrap().get(&branch.name) {
            return Err(Error::Push(message.clone()));
        }
        self.push_calls.lock().unwrap().push(PushCall {
            project: branch.project.path.clone(),
            branch: branch.name.clone(),
            destination: request.destination.clone(),
            refspec: request.spec.refspec.clone(),
            push_options: request.spec.push_options.clone(),
        });
        Ok(())
    }
}

/// Prompter answering from a queue, falling back to the default
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<Vec<String>>,
    asked: Mutex<Vec<String>>,
    said: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().rev().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn said(&self) -> Vec<String> {
        self.said.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, prompt: &str, default: &str) -> Result<String> {
        self.asked.lock().unwrap().push(prompt.to_string());
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| default.to_string()))
    }

    fn say(&self, message: &str) {
        self.said.lock().unwrap().push(message.to_string());
    }
}

/// Editor applying a fixed transformation and keeping what it was shown
pub struct ScriptedEditor {
    edit: Box<dyn Fn(&str) -> String + Send + Sync>,
    shown: Mutex<Vec<String>>,
}

impl ScriptedEditor {
    pub fn new(edit: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            edit: Box::new(edit),
            shown: Mutex::default(),
        }
    }

    /// Uncomment the listed branches
    pub fn selecting(branches: &[&str]) -> Self {
        let branches: Vec<String> = branches.iter().map(ToString::to_string).collect();
        Self::new(move |text| {
            text.lines()
                .map(|line| {
                    let selected = branches
                        .iter()
                        .any(|b| line.starts_with(&format!("#  branch {b} (")));
                    if selected {
                        format!(" {}", &line[1..])
                    } else {
                        line.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

impl Editor for ScriptedEditor {
    fn edit(&self, text: &str) -> Result<String> {
        self.shown.lock().unwrap().push(text.to_string());
        Ok((self.edit)(text))
    }
}
