//! Review metadata carried by an upload
//!
//! An [`OptionSet`] is seeded from command-line flags, filled in from the
//! options saved by a previous upload, and finally overwritten by whatever
//! the operator types into the edit script.

mod codec;
mod store;

pub use store::{OptionStore, UPLOAD_OPTIONS_DIR, UPLOAD_OPTIONS_FILE};

/// Review metadata plus per-invocation upload mechanics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    /// Title of the code review
    pub title: String,
    /// Multi-line description of the code review
    pub description: String,
    /// Related issue IDs, comma joined
    pub issue: String,
    /// Reviewer user names
    pub reviewers: Vec<String>,
    /// Watcher user names (the `Cc` section)
    pub watchers: Vec<String>,
    /// Upload as draft
    pub draft: bool,
    /// Upload as private change
    pub private: bool,
    /// Upload as work in progress
    pub work_in_progress: bool,

    // Not persisted, supplied per invocation
    /// Explicit destination branch (`--dest`)
    pub destination_branch: String,
    /// Extra push options passed through to the server
    pub push_options: Vec<String>,
    /// Send the local branch name as review topic
    pub auto_topic: bool,
    /// Ask the server not to send notification emails
    pub no_emails: bool,
    /// Skip TLS certificate checks when talking to the server
    pub no_cert_checks: bool,
}

impl OptionSet {
    /// Fill fields still empty (or false) with values from a prior session
    ///
    /// Flag-sourced values win over the prior ones; the edited script is
    /// parsed on top afterwards and wins over both.
    pub fn fill_from(&mut self, prior: &Self) {
        if self.title.is_empty() {
            self.title.clone_from(&prior.title);
        }
        if self.description.is_empty() {
            self.description.clone_from(&prior.description);
        }
        if self.issue.is_empty() {
            self.issue.clone_from(&prior.issue);
        }
        if self.reviewers.is_empty() {
            self.reviewers.clone_from(&prior.reviewers);
        }
        if self.watchers.is_empty() {
            self.watchers.clone_from(&prior.watchers);
        }
        self.draft |= prior.draft;
        self.work_in_progress |= prior.work_in_progress;
        self.private |= prior.private;
    }

    /// Reviewers split on commas, trimmed, empty entries dropped
    pub fn reviewer_list(&self) -> Vec<String> {
        split_people(&self.reviewers)
    }

    /// Watchers split on commas, trimmed, empty entries dropped
    pub fn watcher_list(&self) -> Vec<String> {
        split_people(&self.watchers)
    }
}

fn split_people(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| e.split(','))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_from_keeps_flag_values() {
        let mut flags = OptionSet {
            title: "from flag".to_string(),
            ..OptionSet::default()
        };
        let disk = OptionSet {
            title: "from disk".to_string(),
            issue: "#12".to_string(),
            reviewers: vec!["alice".to_string()],
            private: true,
            ..OptionSet::default()
        };

        flags.fill_from(&disk);

        assert_eq!(flags.title, "from flag");
        assert_eq!(flags.issue, "#12");
        assert_eq!(flags.reviewers, vec!["alice"]);
        assert!(flags.private);
        assert!(!flags.draft);
    }

    #[test]
    fn test_merge_precedence_edit_over_flag_over_disk() {
        let disk = OptionSet {
            title: "D".to_string(),
            issue: "disk-issue".to_string(),
            description: "disk description".to_string(),
            ..OptionSet::default()
        };
        let mut opts = OptionSet {
            title: "F".to_string(),
            issue: "flag-issue".to_string(),
            ..OptionSet::default()
        };
        opts.fill_from(&disk);
        opts.parse("# [Title]\n\nE\n");

        assert_eq!(opts.title, "E");
        assert_eq!(opts.issue, "flag-issue");
        assert_eq!(opts.description, "disk description");
    }

    #[test]
    fn test_people_lists_split_commas() {
        let opts = OptionSet {
            reviewers: vec!["alice, bob".to_string(), " ".to_string(), "carol".to_string()],
            watchers: vec!["dave,,alice".to_string()],
            ..OptionSet::default()
        };

        assert_eq!(opts.reviewer_list(), vec!["alice", "bob", "carol"]);
        assert_eq!(opts.watcher_list(), vec!["dave", "alice"]);
    }
}
