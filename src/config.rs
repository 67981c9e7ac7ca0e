//! Upload policy and key/value configuration
//!
//! Global switches are collected once into an [`UploadPolicy`] and passed
//! down explicitly. Per-repository settings are read through the
//! [`ConfigStore`] trait; [`ProjectConfigs`] picks the store of a project.

use crate::error::Result;
use crate::types::Project;
use std::collections::HashMap;
use std::env;
use std::sync::Mutex;

/// Answer every confirmation with yes
pub const ENV_ASSUME_YES: &str = "REPO_ASSUME_YES";
/// Answer every confirmation with no
pub const ENV_ASSUME_NO: &str = "REPO_ASSUME_NO";
/// Skip TLS certificate verification
pub const ENV_NO_CERT_CHECKS: &str = "REPO_NO_CERT_CHECKS";
/// Host/port info used instead of querying `ssh_info`
pub const ENV_HOST_PORT_INFO: &str = "REPO_HOST_PORT_INFO";
/// Never query `ssh_info`
pub const ENV_IGNORE_SSH_INFO: &str = "REPO_IGNORE_SSH_INFO";

/// Policy switches shared by the confirmer and the remote classifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Pre-select every branch and answer prompts with yes
    pub assume_yes: bool,
    /// Leave every branch unselected and answer prompts with no
    pub assume_no: bool,
    /// Skip TLS certificate verification
    pub no_cert_checks: bool,
    /// Externally supplied ssh host/port info
    pub host_port_info: Option<String>,
    /// Never probe `ssh_info`
    pub ignore_ssh_info: bool,
}

impl UploadPolicy {
    /// Build the policy from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the policy from any variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| lookup(name).is_some_and(|v| is_truthy(&v));
        Self {
            assume_yes: flag(ENV_ASSUME_YES),
            assume_no: flag(ENV_ASSUME_NO),
            no_cert_checks: flag(ENV_NO_CERT_CHECKS) || flag("GIT_SSL_NO_VERIFY"),
            host_port_info: lookup(ENV_HOST_PORT_INFO).filter(|v| !v.is_empty()),
            ignore_ssh_info: lookup(ENV_IGNORE_SSH_INFO).is_some_and(|v| !v.is_empty()),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "on" | "t" | "true"
    )
}

/// Config key allowing (`true`) or blocking (`false`) uploads without a prompt
pub fn autoupload_key(review_url: &str) -> String {
    format!("review.{review_url}.autoupload")
}

/// Config key turning on auto-topic for a review server
pub fn uploadtopic_key(review_url: &str) -> String {
    format!("review.{review_url}.uploadtopic")
}

/// Interpret a git-style boolean config value
pub fn parse_config_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "yes" | "on" | "true" => Some(true),
        "0" | "no" | "off" | "false" => Some(false),
        _ => None,
    }
}

/// Low-level key/value configuration storage
pub trait ConfigStore: Send + Sync {
    /// Get the value of a key
    fn get(&self, key: &str) -> Option<String>;

    /// Set a key
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key
    fn unset(&self, key: &str) -> Result<()>;

    /// Flush pending changes
    fn save(&self) -> Result<()>;

    /// Whether the key is set at all
    fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Boolean value of a key, `default` when unset or unparsable
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|v| parse_config_bool(&v))
            .unwrap_or(default)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn unset(&self, key: &str) -> Result<()> {
        (**self).unset(key)
    }

    fn save(&self) -> Result<()> {
        (**self).save()
    }
}

/// Source of the config store answering for each project
pub trait ProjectConfigs: Send + Sync {
    /// Config of the repository behind `project`
    fn config_for<'a>(&'a self, project: &Project) -> Box<dyn ConfigStore + 'a>;
}

/// In-memory config store
#[derive(Debug, Default)]
pub struct MemoryConfig {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryConfig {
    /// Create a store holding the given pairs
    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn unset(&self, key: &str) -> Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        Ok(())
    }
}

/// One in-memory store shared by every project
impl ProjectConfigs for MemoryConfig {
    fn config_for<'a>(&'a self, _project: &Project) -> Box<dyn ConfigStore + 'a> {
        Box::new(self)
    }
}
