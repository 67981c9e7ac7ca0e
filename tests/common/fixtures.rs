//! Test data factories for upload types
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use repo_upload::types::{PendingBranch, Project};

/// Project named `platform/<path>` reviewed at `review_url`
pub fn make_project(path: &str, review_url: &str) -> Project {
    Project {
        name: format!("platform/{path}"),
        path: path.to_string(),
        remote_name: "origin".to_string(),
        review_url: review_url.to_string(),
        revision: "main".to_string(),
    }
}

/// Branch tracking `refs/heads/main` with `commits` pending commits
pub fn make_branch(project: &Project, name: &str, commits: usize) -> PendingBranch {
    PendingBranch {
        project: project.clone(),
        name: name.to_string(),
        destination: "main".to_string(),
        tracking_branch: Some("refs/heads/main".to_string()),
        commits: (0..commits)
            .map(|i| format!("{:07x} {name} change {i}", 0xabc_0000 + i))
            .collect(),
        published: false,
    }
}

/// Branch without an upstream merge ref
pub fn make_untracked_branch(project: &Project, name: &str, commits: usize) -> PendingBranch {
    PendingBranch {
        tracking_branch: None,
        ..make_branch(project, name, commits)
    }
}
