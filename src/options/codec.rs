//! Text format of upload options
//!
//! Options are written as a commented template:
//!
//! ```text
//! # [Title]       : one line message below as the title of code review
//!
//! Fix flaky upload test
//!
//! # [Reviewer]    : multiple lines of user names as the reviewers for code review
//!
//! alice
//! ```
//!
//! The same format is used for the options file saved between uploads and
//! for the first part of the edit script.

use super::OptionSet;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Width the bracketed section name is padded to
const SECTION_WIDTH: usize = 13;

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*\[(\S+?)\](\s*:.*)?$").expect("hardcoded section regex is valid")
});

/// Sections of the options template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Title,
    Description,
    Issue,
    Reviewer,
    Cc,
    Draft,
    Private,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "issue" => Some(Self::Issue),
            "reviewer" => Some(Self::Reviewer),
            "cc" => Some(Self::Cc),
            "draft" => Some(Self::Draft),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Title => "[Title]",
            Self::Description => "[Description]",
            Self::Issue => "[Issue]",
            Self::Reviewer => "[Reviewer]",
            Self::Cc => "[Cc]",
            Self::Draft => "[Draft]",
            Self::Private => "[Private]",
        }
    }

    const fn help(self) -> &'static str {
        match self {
            Self::Title => "one line message below as the title of code review",
            Self::Description => "multiple lines of text as the description of code review",
            Self::Issue => "multiple lines of issue IDs for cross references",
            Self::Reviewer => "multiple lines of user names as the reviewers for code review",
            Self::Cc => "multiple lines of user names as the watchers for code review",
            Self::Draft => "a boolean (yes/no, or true/false) to turn on/off draft mode",
            Self::Private => "a boolean (yes/no, or true/false) to turn on/off private mode",
        }
    }

    fn header(self) -> String {
        format!(
            "# {:<width$} : {}",
            self.label(),
            self.help(),
            width = SECTION_WIDTH
        )
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "y" | "yes" | "on" | "t" | "true" | "1" => Some(true),
        "n" | "no" | "off" | "f" | "false" | "0" => Some(false),
        _ => None,
    }
}

impl OptionSet {
    /// Render the options as template lines
    ///
    /// Title and description are left out for `published` branches: an
    /// existing review cannot change them.
    pub fn serialize(&self, published: bool) -> Vec<String> {
        let mut lines = Vec::new();

        if !published {
            push_section(&mut lines, Section::Title, self.title.lines());
            push_section(&mut lines, Section::Description, self.description.lines());
        }
        push_section(&mut lines, Section::Issue, self.issue.lines());
        push_section(
            &mut lines,
            Section::Reviewer,
            self.reviewers.iter().map(String::as_str),
        );
        push_section(
            &mut lines,
            Section::Cc,
            self.watchers.iter().map(String::as_str),
        );
        push_section(&mut lines, Section::Draft, self.draft.then_some("yes"));
        push_section(&mut lines, Section::Private, self.private.then_some("yes"));

        lines
    }

    /// Parse template text, overwriting every field the text specifies
    ///
    /// Sections left empty keep their current value, so a smaller document
    /// can be layered on top of a fuller one.
    pub fn parse(&mut self, text: &str) {
        let mut section: Option<Section> = None;
        let mut buffer = String::new();

        for line in text.split('\n') {
            let line = line.trim_end_matches([' ', '\t', '\r']);

            if let Some(caps) = SECTION_HEADER.captures(line) {
                let name = caps[1].to_ascii_lowercase();
                if let Some(next) = Section::from_name(&name) {
                    if let Some(open) = section {
                        self.flush(open, &buffer);
                    }
                    section = Some(next);
                    buffer.clear();
                    continue;
                }
                warn!("unknown section '{name}' in script");
            }

            if line.starts_with('#') {
                continue;
            }

            if section.is_some() {
                buffer.push_str(line);
                buffer.push('\n');
            }
        }

        if let Some(open) = section {
            self.flush(open, &buffer);
        }
    }

    fn flush(&mut self, section: Section, buffer: &str) {
        let text = buffer.trim();
        if text.is_empty() {
            return;
        }

        match section {
            Section::Title => {
                self.title = text.lines().next().unwrap_or_default().to_string();
            }
            Section::Description => self.description = text.to_string(),
            Section::Issue => self.issue = text.lines().collect::<Vec<_>>().join(","),
            Section::Reviewer => self.reviewers = non_blank_lines(text),
            Section::Cc => self.watchers = non_blank_lines(text),
            Section::Draft | Section::Private => {
                let Some(value) = parse_bool(text) else {
                    warn!("cannot turn '{text}' to boolean");
                    return;
                };
                if section == Section::Draft {
                    self.draft = value;
                } else {
                    self.private = value;
                }
            }
        }
    }
}

fn push_section<'a>(
    lines: &mut Vec<String>,
    section: Section,
    values: impl IntoIterator<Item = &'a str>,
) {
    lines.push(section.header());
    let mut values = values.into_iter().peekable();
    if values.peek().is_some() {
        lines.push(String::new());
        lines.extend(values.map(ToString::to_string));
    }
    lines.push(String::new());
}

fn non_blank_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect()
}
