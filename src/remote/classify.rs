//! Review server classification
//!
//! Decides whether a remote's review endpoint is a Gerrit server, an AGit
//! server or something we know nothing about. URL suffixes and the
//! environment are consulted first; only when they are inconclusive is the
//! server's `ssh_info` endpoint queried.

use crate::config::UploadPolicy;
use crate::error::Result;
use crate::types::{RemoteClassification, RemoteType};
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{debug, error};

/// Connect and request timeout for `ssh_info` probes
pub const SSH_INFO_TIMEOUT_SECS: u64 = 10;

/// Sentinel body of a Gerrit server without ssh access
const NOT_AVAILABLE: &str = "NOT_AVAILABLE";

/// Lines kept after the first one of an `ssh_info` payload
const MAX_EXTRA_INFO_LINES: usize = 11;

/// What is known about a remote before classifying it
#[derive(Debug, Clone, Default)]
pub struct ClassifyRequest {
    /// Review endpoint as configured (may be empty)
    pub review_url: String,
    /// Type configured for the remote, if any
    pub preset_type: Option<RemoteType>,
    /// Connection info configured for the remote, if any
    pub preset_info: Option<String>,
}

impl ClassifyRequest {
    /// Request for a bare review URL
    pub fn new(review_url: impl Into<String>) -> Self {
        Self {
            review_url: review_url.into(),
            ..Self::default()
        }
    }
}

/// Review URL with type hints taken out of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    /// URL to query, without type suffixes or `/ssh_info`
    pub url: String,
    /// Type implied by a `/gerrit` or `/agit` suffix
    pub remote_type: Option<RemoteType>,
}

impl NormalizedUrl {
    fn is_ssh(&self) -> bool {
        self.url.starts_with("sso:") || self.url.starts_with("ssh:")
    }
}

/// Normalize a configured review URL; `None` when there is no review server
pub fn normalize_review_url(review_url: &str) -> Option<NormalizedUrl> {
    let mut url = review_url.trim().trim_end_matches('/');
    if url.is_empty() {
        return None;
    }

    url = url.strip_prefix("persistent-").unwrap_or(url);
    let scheme = url.split(':').next().unwrap_or_default();
    let mut url = if matches!(scheme, "http" | "https" | "sso" | "ssh") {
        url.to_string()
    } else {
        format!("http://{url}")
    };

    let mut remote_type = None;
    if let Some(stripped) = strip_suffix_ignore_case(&url, "/gerrit") {
        url = stripped;
        remote_type = Some(RemoteType::Gerrit);
    }
    if let Some(stripped) = strip_suffix_ignore_case(&url, "/agit") {
        url = stripped;
        remote_type = Some(RemoteType::AGit);
    }
    if let Some(stripped) = url.strip_suffix("/ssh_info") {
        url = stripped.to_string();
    }

    Some(NormalizedUrl { url, remote_type })
}

fn strip_suffix_ignore_case(url: &str, suffix: &str) -> Option<String> {
    let split = url.len().checked_sub(suffix.len())?;
    let tail = url.get(split..)?;
    tail.eq_ignore_ascii_case(suffix)
        .then(|| url[..split].to_string())
}

/// Classifies review servers, sharing one HTTP client across calls
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: Client,
    policy: UploadPolicy,
}

impl RemoteClassifier {
    /// Create a classifier for the given policy
    pub fn new(policy: UploadPolicy) -> Result<Self> {
        let timeout = Duration::from_secs(SSH_INFO_TIMEOUT_SECS);
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .pool_max_idle_per_host(1)
            .danger_accept_invalid_certs(policy.no_cert_checks)
            .build()?;

        Ok(Self { client, policy })
    }

    /// Classify the review server behind `request.review_url`
    ///
    /// Transport errors while querying `ssh_info` are returned to the
    /// caller; every other inconclusive answer yields a classification.
    pub async fn classify(&self, request: &ClassifyRequest) -> Result<RemoteClassification> {
        let Some(normalized) = normalize_review_url(&request.review_url) else {
            return Ok(RemoteClassification::unknown(""));
        };
        let remote_type = normalized.remote_type.or(request.preset_type);

        if self.policy.host_port_info.is_some() || normalized.is_ssh() || self.policy.ignore_ssh_info
        {
            return Ok(RemoteClassification {
                remote_type: remote_type.unwrap_or(RemoteType::Gerrit),
                connection_info: self
                    .policy
                    .host_port_info
                    .clone()
                    .or_else(|| request.preset_info.clone()),
                review_url: normalized.url,
            });
        }

        let info_url = format!("{}/ssh_info", normalized.url);
        debug!("start checking ssh_info from {info_url}");

        let response = self
            .client
            .get(&info_url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 300 {
            error!("bad ssh_info response, status: {}", status.as_u16());
            return Ok(RemoteClassification {
                remote_type: remote_type.unwrap_or(RemoteType::Unknown),
                connection_info: None,
                review_url: normalized.url,
            });
        }

        let body = response.text().await?;
        Ok(classify_ssh_info(&body, remote_type, normalized.url))
    }
}

/// Interpret an `ssh_info` response body
///
/// Only the first line is inspected: `NOT_AVAILABLE` means a Gerrit server
/// without ssh, a leading `<` is taken for an HTML page (a login form, most
/// likely) and means we cannot tell.
fn classify_ssh_info(
    body: &str,
    remote_type: Option<RemoteType>,
    review_url: String,
) -> RemoteClassification {
    let mut lines = body.split_inclusive('\n');
    let first = lines.next().unwrap_or_default();

    if first.trim_end_matches(['\r', '\n']) == NOT_AVAILABLE || first.starts_with('<') {
        let fallback = if first.starts_with('<') {
            RemoteType::Unknown
        } else {
            RemoteType::Gerrit
        };
        return RemoteClassification {
            remote_type: remote_type.unwrap_or(fallback),
            connection_info: None,
            review_url,
        };
    }

    let mut info = first.to_string();
    for line in lines.take(MAX_EXTRA_INFO_LINES) {
        info.push_str(line);
    }

    RemoteClassification {
        remote_type: remote_type.unwrap_or(RemoteType::Unknown),
        connection_info: (!info.is_empty()).then_some(info),
        review_url,
    }
}
