//! Review servers behind git remotes
//!
//! Classification tells which [`Transport`] an upload has to use.

mod classify;
mod transport;

pub use classify::{
    ClassifyRequest, NormalizedUrl, RemoteClassifier, SSH_INFO_TIMEOUT_SECS, normalize_review_url,
};
pub use transport::{PushSpec, PushTarget, Transport};

use crate::config::ConfigStore;
use crate::error::Result;
use crate::types::{Project, RemoteClassification, RemoteType};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Config key holding a preset type for a remote
pub fn remote_type_key(remote_name: &str) -> String {
    format!("manifest.remote.{remote_name}.type")
}

/// Config key holding preset ssh info for a remote
pub fn remote_ssh_info_key(remote_name: &str) -> String {
    format!("manifest.remote.{remote_name}.sshinfo")
}

/// Classifications cached per remote name for the duration of one run
#[derive(Debug)]
pub struct RemoteRegistry {
    classifier: RemoteClassifier,
    cache: Mutex<HashMap<String, RemoteClassification>>,
    ignore_cache: bool,
}

impl RemoteRegistry {
    /// Wrap a classifier; `ignore_cache` re-classifies on every lookup
    pub fn new(classifier: RemoteClassifier, ignore_cache: bool) -> Self {
        Self {
            classifier,
            cache: Mutex::new(HashMap::new()),
            ignore_cache,
        }
    }

    /// Classification of the project's remote
    ///
    /// Presets are read from `manifest.remote.<name>.type` and
    /// `manifest.remote.<name>.sshinfo`.
    pub async fn classify(
        &self,
        project: &Project,
        config: &dyn ConfigStore,
    ) -> Result<RemoteClassification> {
        let name = &project.remote_name;
        if !self.ignore_cache {
            if let Some(cached) = self.cached(name) {
                debug!("using cached classification for remote {name}");
                return Ok(cached);
            }
        }

        let preset_type = config
            .get(&remote_type_key(name))
            .filter(|t| !t.is_empty())
            .and_then(|t| match t.parse::<RemoteType>() {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("ignoring preset for remote {name}: {e}");
                    None
                }
            });
        let request = ClassifyRequest {
            review_url: project.review_url.clone(),
            preset_type,
            preset_info: config
                .get(&remote_ssh_info_key(name))
                .filter(|i| !i.is_empty()),
        };

        let classification = self.classifier.classify(&request).await?;
        debug!(
            "remote {name} classified as {} ({})",
            classification.remote_type, classification.review_url
        );

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name.clone(), classification.clone());
        }
        Ok(classification)
    }

    fn cached(&self, name: &str) -> Option<RemoteClassification> {
        self.cache.lock().ok()?.get(name).cloned()
    }
}
