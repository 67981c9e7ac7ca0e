//! Push transport per review server type

use crate::options::OptionSet;
use crate::types::{RemoteType, short_branch};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

/// How commits reach the review server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Plain push to the destination branch
    Direct,
    /// Gerrit magic refs, `refs/for/<dest>%<params>`
    RefsFor,
    /// AGit flow, `refs/for/<dest>/<topic>` plus push options
    AGit,
}

/// Refspec and push options for one upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSpec {
    /// Refspec handed to `git push`
    pub refspec: String,
    /// Values for `git push -o`
    pub push_options: Vec<String>,
}

/// Everything needed to build a [`PushSpec`]
#[derive(Debug, Clone, Copy)]
pub struct PushTarget<'a> {
    /// Local branch being uploaded
    pub local_branch: &'a str,
    /// Destination branch on the remote
    pub destination: &'a str,
    /// Review metadata
    pub options: &'a OptionSet,
    /// Reviewers after splitting
    pub reviewers: &'a [String],
    /// Watchers after splitting
    pub watchers: &'a [String],
}

impl Transport {
    /// Transport used for a classified remote
    pub const fn for_remote(remote_type: RemoteType) -> Self {
        match remote_type {
            RemoteType::Unknown => Self::Direct,
            RemoteType::Gerrit => Self::RefsFor,
            RemoteType::AGit => Self::AGit,
        }
    }

    /// Build the refspec and push options for `target`
    pub fn push_spec(self, target: &PushTarget<'_>) -> PushSpec {
        let local = short_branch(target.local_branch);
        let dest = short_branch(target.destination);
        let options = target.options;
        let mut push_options = Vec::new();

        let refspec = match self {
            Self::Direct => format!("refs/heads/{local}:refs/heads/{dest}"),
            Self::RefsFor => {
                let mut params: Vec<String> = Vec::new();
                params.extend(target.reviewers.iter().map(|r| format!("r={r}")));
                params.extend(target.watchers.iter().map(|c| format!("cc={c}")));
                if options.auto_topic {
                    params.push(format!("topic={local}"));
                }
                if options.work_in_progress {
                    params.push("wip".to_string());
                }
                if options.private {
                    params.push("private".to_string());
                }
                if options.no_emails {
                    params.push("notify=NONE".to_string());
                }

                let kind = if options.draft { "drafts" } else { "for" };
                let mut refspec = format!("refs/heads/{local}:refs/{kind}/{dest}");
                if !params.is_empty() {
                    refspec.push('%');
                    refspec.push_str(&params.join(","));
                }
                refspec
            }
            Self::AGit => {
                if !options.title.is_empty() {
                    push_options.push(format!("title={{base64}}{}", BASE64.encode(&options.title)));
                }
                if !options.description.is_empty() {
                    push_options.push(format!(
                        "description={{base64}}{}",
                        BASE64.encode(&options.description)
                    ));
                }
                if !options.issue.is_empty() {
                    push_options.push(format!("issue={}", options.issue));
                }
                if !target.reviewers.is_empty() {
                    push_options.push(format!("reviewers={}", target.reviewers.join(",")));
                }
                if !target.watchers.is_empty() {
                    push_options.push(format!("cc={}", target.watchers.join(",")));
                }
                if options.draft {
                    push_options.push("draft=yes".to_string());
                }
                if options.private {
                    push_options.push("private=yes".to_string());
                }
                if options.work_in_progress {
                    push_options.push("wip=yes".to_string());
                }
                if options.no_emails {
                    push_options.push("notify=no".to_string());
                }
                format!("refs/heads/{local}:refs/for/{dest}/{local}")
            }
        };

        push_options.extend(options.push_options.iter().cloned());

        PushSpec {
            refspec,
            push_options,
        }
    }
}
