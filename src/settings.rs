//! Configuration for ticketsmith runs.
//!
//! Settings are read from a TOML file (`ticketsmith.toml` by default) and
//! layered with the environment: the API token may come from the
//! `TICKETSMITH_TOKEN` variable (a `.env` file works, loaded at startup)
//! instead of being written into the config file.
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! base_url = "https://gitlab.example.com"
//! project_id = 42
//! # token = "glpat-..."        # or set TICKETSMITH_TOKEN
//!
//! [content]
//! description_file = "description.md"
//!
//! [folders]
//! template_dir = "templates/feature"
//! destination_root = "/work/tickets"
//!
//! [notifications]
//! enabled = true
//!
//! [[issues]]
//! title = "Improve login flow"
//! labels = ["Backend"]
//! estimate_hours = 10
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted for the API token before `[service].token`.
pub const TOKEN_ENV: &str = "TICKETSMITH_TOKEN";

/// One issue to create, with its labels and optional time estimate.
///
/// `estimate_hours = 0` (the default) means no estimate call is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSpec {
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub estimate_hours: u32,
}

/// Remote issue-service coordinates and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service base URL, e.g. `https://gitlab.example.com`
    pub base_url: String,
    /// Numeric project id the issues are created in
    pub project_id: i64,
    /// API token; prefer `TICKETSMITH_TOKEN` over storing it here
    #[serde(default)]
    pub token: Option<String>,
}

/// Issue body content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSettings {
    /// Markdown file whose contents become the body of every created issue
    pub description_file: PathBuf,
}

/// Template and destination paths for folder provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderSettings {
    /// Directory tree copied into each provisioned folder
    pub template_dir: PathBuf,
    /// Parent directory for per-issue folders (`<destination_root>/<iid>`)
    pub destination_root: PathBuf,
}

/// Desktop notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

fn default_notifications_enabled() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
        }
    }
}

/// Top-level configuration, deserialized from `ticketsmith.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub service: ServiceSettings,
    pub content: ContentSettings,
    pub folders: FolderSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub issues: Vec<IssueSpec>,
}

impl Settings {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse ticketsmith.toml")
    }

    /// Resolve the API token: environment first, then the config file.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.service.token.clone())
    }

    /// Read the shared issue description, used verbatim for every spec.
    pub fn read_description(&self) -> Result<String> {
        std::fs::read_to_string(&self.content.description_file).with_context(|| {
            format!(
                "Failed to read description file: {}",
                self.content.description_file.display()
            )
        })
    }

    /// Validate the configuration and return any problems found.
    ///
    /// An empty issue list is not a problem — `run` reports "nothing to do".
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.service.base_url.is_empty() {
            problems.push("[service].base_url is empty".to_string());
        } else if !self.service.base_url.starts_with("http://")
            && !self.service.base_url.starts_with("https://")
        {
            problems.push(format!(
                "[service].base_url '{}' is not an http(s) URL",
                self.service.base_url
            ));
        }

        if self.resolve_token().is_none() {
            problems.push(format!(
                "No API token: set {} or [service].token",
                TOKEN_ENV
            ));
        }

        if !self.content.description_file.is_file() {
            problems.push(format!(
                "[content].description_file '{}' does not exist",
                self.content.description_file.display()
            ));
        }

        if !self.folders.template_dir.is_dir() {
            problems.push(format!(
                "[folders].template_dir '{}' is not a directory",
                self.folders.template_dir.display()
            ));
        }

        for (i, issue) in self.issues.iter().enumerate() {
            if issue.title.trim().is_empty() {
                problems.push(format!("[[issues]] entry {} has an empty title", i + 1));
            }
        }

        problems
    }
}

/// Commented sample written by `ticketsmith config init`.
pub const SAMPLE_CONFIG: &str = r#"# ticketsmith configuration

[service]
base_url = "https://gitlab.example.com"
project_id = 42
# The API token may live here, but the TICKETSMITH_TOKEN environment
# variable (or a .env file) takes precedence and keeps it out of the repo.
# token = "glpat-..."

[content]
# Markdown file used verbatim as the body of every created issue.
description_file = "description.md"

[folders]
# Template tree copied into each provisioned folder.
template_dir = "templates/feature"
# Folders are created as <destination_root>/<issue id>.
destination_root = "/work/tickets"

[notifications]
enabled = true

[[issues]]
title = "Improve login flow"
labels = ["Backend"]
estimate_hours = 10
"#;
