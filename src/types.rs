//! Core types for repo-upload

use std::fmt;
use std::str::FromStr;

/// Full ref prefix of local branches
pub const REFS_HEADS: &str = "refs/heads/";

/// A repository taking part in an upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    /// Project name, unique within the workspace
    pub name: String,
    /// Path relative to the workspace root ("." for a single repository)
    pub path: String,
    /// Name of the remote uploads go to
    pub remote_name: String,
    /// Review endpoint of that remote (empty when it has none)
    pub review_url: String,
    /// Default revision the project tracks
    pub revision: String,
}

/// A local branch with commits not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBranch {
    /// Project owning the branch
    pub project: Project,
    /// Local branch name (without `refs/heads/`)
    pub name: String,
    /// Remote branch the commits are proposed for
    pub destination: String,
    /// Upstream merge ref configured for the branch, if any
    pub tracking_branch: Option<String>,
    /// One-line summaries of the pending commits, newest first
    pub commits: Vec<String>,
    /// Whether the branch head was already published for review
    pub published: bool,
}

impl PendingBranch {
    /// Destination branch, letting an explicit `--dest` win
    pub fn destination_with(&self, dest_override: &str) -> String {
        if dest_override.is_empty() {
            self.destination.clone()
        } else {
            dest_override.to_string()
        }
    }
}

/// Kind of code review server behind a remote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RemoteType {
    /// No review server, or one we could not identify
    #[default]
    Unknown,
    /// Gerrit, reviews are created by pushing to `refs/for/<branch>`
    Gerrit,
    /// AGit flow, reviews are created with push options
    AGit,
}

impl fmt::Display for RemoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Gerrit => write!(f, "gerrit"),
            Self::AGit => write!(f, "agit"),
        }
    }
}

impl FromStr for RemoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "unknown" => Ok(Self::Unknown),
            "gerrit" => Ok(Self::Gerrit),
            "agit" => Ok(Self::AGit),
            other => Err(format!("unknown remote type: {other}")),
        }
    }
}

/// Result of classifying a remote's review server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteClassification {
    /// Detected server type
    pub remote_type: RemoteType,
    /// Opaque ssh_info payload, when the server published one
    pub connection_info: Option<String>,
    /// Review URL after normalization
    pub review_url: String,
}

impl RemoteClassification {
    /// Classification for a remote without a usable review server
    pub fn unknown(review_url: impl Into<String>) -> Self {
        Self {
            remote_type: RemoteType::Unknown,
            connection_info: None,
            review_url: review_url.into(),
        }
    }
}

/// Strip `refs/heads/` from a branch name
pub fn short_branch(name: &str) -> &str {
    name.strip_prefix(REFS_HEADS).unwrap_or(name)
}

/// Prefix a branch name with `refs/heads/` unless it already is a full ref
pub fn full_branch(name: &str) -> String {
    if name.starts_with(REFS_HEADS) {
        name.to_string()
    } else {
        format!("{REFS_HEADS}{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_type_parse() {
        assert_eq!("Gerrit".parse::<RemoteType>(), Ok(RemoteType::Gerrit));
        assert_eq!("agit".parse::<RemoteType>(), Ok(RemoteType::AGit));
        assert_eq!("".parse::<RemoteType>(), Ok(RemoteType::Unknown));
        assert!("svn".parse::<RemoteType>().is_err());
    }

    #[test]
    fn test_branch_prefix_helpers() {
        assert_eq!(short_branch("refs/heads/main"), "main");
        assert_eq!(short_branch("main"), "main");
        assert_eq!(full_branch("main"), "refs/heads/main");
        assert_eq!(full_branch("refs/heads/dev/x"), "refs/heads/dev/x");
    }
}
