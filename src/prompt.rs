//! Console prompts

use crate::config::UploadPolicy;
use crate::error::{Error, Result};
use dialoguer::Input;

/// Asks the operator a question on the console
pub trait Prompter: Send + Sync {
    /// Ask `prompt`, returning `default` when the answer is empty
    fn ask(&self, prompt: &str, default: &str) -> Result<String>;

    /// Print an informational line for the operator
    fn say(&self, message: &str) {
        println!("{message}");
    }
}

/// Whether an answer means yes
pub fn answer_is_true(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "t" | "true" | "on" | "1"
    )
}

/// Ask a yes/no question defaulting to no, honouring assume-yes/no
pub fn confirm(prompter: &dyn Prompter, policy: &UploadPolicy, prompt: &str) -> Result<bool> {
    if policy.assume_yes {
        return Ok(true);
    }
    if policy.assume_no {
        return Ok(false);
    }
    Ok(answer_is_true(&prompter.ask(prompt, "N")?))
}

/// Interactive prompter on the controlling terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, prompt: &str, default: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt.trim_end())
            .default(default.to_string())
            .show_default(false)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}
