//! Choosing which branches get uploaded
//!
//! A single pending branch is confirmed on the console; anything more goes
//! through the edit script.

use super::script::EditScript;
use crate::config::{ConfigStore, UploadPolicy, autoupload_key};
use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::options::{OptionSet, OptionStore};
use crate::prompt::{Prompter, confirm};
use crate::types::PendingBranch;
use tracing::{debug, warn};

/// Commit count above which an upload needs an extra confirmation
pub const UNUSUAL_COMMIT_THRESHOLD: usize = 5;

/// Branches picked for upload, with the options to upload them with
#[derive(Debug, Clone)]
pub struct Selection {
    /// Review options
    pub options: OptionSet,
    /// Branches to push, in order
    pub branches: Vec<PendingBranch>,
}

/// Turns candidate branches into a [`Selection`]
pub trait BranchCollector {
    /// Pick branches out of `candidates`; `options` come from the flags
    fn collect(&self, candidates: &[PendingBranch], options: OptionSet) -> Result<Selection>;
}

/// Yes/no confirmation of exactly one branch
pub struct ConfirmCollector<'a> {
    config: &'a dyn ConfigStore,
    prompter: &'a dyn Prompter,
    policy: &'a UploadPolicy,
}

impl<'a> ConfirmCollector<'a> {
    /// Confirm through `prompter`, honouring `review.<url>.autoupload`
    pub fn new(
        config: &'a dyn ConfigStore,
        prompter: &'a dyn Prompter,
        policy: &'a UploadPolicy,
    ) -> Self {
        Self {
            config,
            prompter,
            policy,
        }
    }

    fn print_summary(&self, branch: &PendingBranch, options: &OptionSet) {
        let project = &branch.project;
        let destination = branch.destination_with(&options.destination_branch);
        let draft = if options.draft { " (draft)" } else { "" };

        if project.path == "." {
            self.prompter.say(&format!(
                "Upload project ({}) to remote branch {destination}{draft}:",
                project.name
            ));
        } else {
            self.prompter.say(&format!(
                "Upload project {}/ to remote branch {destination}{draft}:",
                project.path
            ));
        }
        self.prompter.say(&format!(
            "  branch {} ({:2} commit(s)):",
            branch.name,
            branch.commits.len()
        ));
        for commit in &branch.commits {
            self.prompter.say(&format!("         {commit}"));
        }
    }
}

impl BranchCollector for ConfirmCollector<'_> {
    fn collect(&self, candidates: &[PendingBranch], options: OptionSet) -> Result<Selection> {
        let [branch] = candidates else {
            return Err(Error::Internal(format!(
                "confirmation needs exactly one branch, got {}",
                candidates.len()
            )));
        };
        let review_url = &branch.project.review_url;
        let key = autoupload_key(review_url);

        if self.config.has_key(&key) {
            if !self.config.get_bool(&key, false) {
                return Err(Error::PolicyBlocked { key });
            }
            debug!("{key} allows upload without asking");
        } else {
            self.print_summary(branch, &options);
            if !confirm(
                self.prompter,
                self.policy,
                &format!("to {review_url} (y/N)? "),
            )? {
                return Err(Error::UserAborted);
            }
        }

        if branch.commits.len() > UNUSUAL_COMMIT_THRESHOLD {
            self.prompter
                .say("ATTENTION: You are uploading an unusually high number of commits.");
            self.prompter
                .say("YOU PROBABLY DO NOT MEAN TO DO THIS. (Did you rebase across branches?)");
            if !confirm(
                self.prompter,
                self.policy,
                "If you are sure you intend to do this, type 'yes': ",
            )? {
                return Err(Error::UserAborted);
            }
        }

        Ok(Selection {
            options,
            branches: vec![branch.clone()],
        })
    }
}

/// Selection through an edited [`EditScript`]
pub struct EditorCollector<'a> {
    editor: &'a dyn Editor,
    store: &'a OptionStore,
    policy: &'a UploadPolicy,
}

impl<'a> EditorCollector<'a> {
    /// Edit scripts with `editor`, saving options through `store`
    pub fn new(editor: &'a dyn Editor, store: &'a OptionStore, policy: &'a UploadPolicy) -> Self {
        Self {
            editor,
            store,
            policy,
        }
    }
}

impl BranchCollector for EditorCollector<'_> {
    fn collect(&self, candidates: &[PendingBranch], options: OptionSet) -> Result<Selection> {
        let script = EditScript::build(candidates, &options, self.store, self.policy);
        let edited = self.editor.edit(&script.text)?;

        let options = script.parse_options(&edited);
        if let Err(e) = self.store.save(&script.options_file, &options) {
            warn!("cannot save upload options: {e}");
        }

        let branches = script.parse_selection(&edited)?;
        Ok(Selection { options, branches })
    }
}
