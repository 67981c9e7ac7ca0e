//! Styled progress output for the upload command

use crate::cli::style::{Stylize, check, cross, spinner_style};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use repo_upload::types::{PendingBranch, RemoteClassification};
use repo_upload::upload::{Phase, ProgressCallback};
use std::sync::Mutex;
use std::time::Duration;

/// Prints upload progress, with a spinner while review servers are probed
#[derive(Default)]
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_spinner(&self, message: &str) {
        let Ok(mut slot) = self.spinner.lock() else {
            return;
        };
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        if let Some(old) = slot.replace(spinner) {
            old.finish_and_clear();
        }
    }

    fn stop_spinner(&self) {
        if let Some(spinner) = self.spinner.lock().ok().and_then(|mut s| s.take()) {
            spinner.finish_and_clear();
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        match phase {
            Phase::Classifying => self.start_spinner("Checking review server..."),
            Phase::Pushing => println!("{}", "Uploading...".emphasis()),
            Phase::Complete => self.stop_spinner(),
            Phase::Collecting | Phase::Selecting => {}
        }
    }

    async fn on_classified(&self, branch: &PendingBranch, classification: &RemoteClassification) {
        self.stop_spinner();
        println!(
            "  {} {} ({})",
            branch.project.remote_name.accent(),
            classification.review_url,
            classification.remote_type.to_string().muted()
        );
    }

    async fn on_uploaded(&self, branch: &PendingBranch, destination: &str) {
        println!(
            "  {} {}/ {} {} {}",
            check(),
            branch.project.path,
            branch.name.accent(),
            "to".muted(),
            destination
        );
    }

    async fn on_failed(&self, branch: &PendingBranch, error: &str) {
        self.stop_spinner();
        eprintln!(
            "  {} {}/ {}: {}",
            cross(),
            branch.project.path,
            branch.name.accent().for_stderr(),
            error.error()
        );
    }

    async fn on_message(&self, message: &str) {
        println!("{message}");
    }
}
