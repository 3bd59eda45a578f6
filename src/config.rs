//! Reminder configuration.
//!
//! Handles locating, loading, and validating the TOML config document. Values
//! in the document are layered over stock defaults; command-line flags are
//! applied last through [`ConfigOverrides`].
//!
//! ## Config File Location
//!
//! `~/.confluence_reminder.toml` unless `--configfile` points elsewhere.
//! Unlike many tools, a missing file is an error: without pages to check
//! there is nothing to do.
//!
//! ## Configuration Options
//!
//! ```toml
//! base_url = "https://wiki.example.com/rest/api/content"  # required
//! sender = "wiki-reminder@example.com"   # required once any page has `email`
//! verbose = true                          # print version and URL per page
//!
//! [smtp]
//! host = "localhost"
//! port = 25
//!
//! [[pages]]
//! page_id = 42
//! max_age = 30                            # days
//! email = ["a@example.com", "b@example.com"]  # or a single string
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use lettre::message::Mailbox;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the default config, placed in the user's home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".confluence_reminder.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything a run needs, as loaded from the config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Print version, editor, and URL for each page in addition to its age.
    pub verbose: bool,
    /// Content API endpoint; page ids are appended as a path segment.
    pub base_url: String,
    /// `From` address of reminder mails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Mail relay the reminders are submitted to.
    pub smtp: SmtpConfig,
    /// Pages to check, in the order they are processed.
    pub pages: Vec<PageRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: true,
            base_url: String::new(),
            sender: None,
            smtp: SmtpConfig::default(),
            pages: Vec::new(),
        }
    }
}

/// Plain SMTP relay without TLS or authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25,
        }
    }
}

/// One watched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageRule {
    #[serde(deserialize_with = "deserialize_page_id")]
    pub page_id: u64,
    /// Maximum age in days before the page counts as outdated.
    pub max_age: u32,
    /// Who gets reminded. Pages without recipients are only reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Recipients>,
}

/// A single address or an ordered list of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn addresses(&self) -> Vec<&str> {
        match self {
            Recipients::One(address) => vec![address.as_str()],
            Recipients::Many(addresses) => addresses.iter().map(String::as_str).collect(),
        }
    }

    /// Addresses in configured order, joined the way the `To` header shows them.
    pub fn header_value(&self) -> String {
        self.addresses().join(", ")
    }
}

/// Page ids are numeric, but hand-written configs often quote them.
fn deserialize_page_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("page_id {text:?} is not a number"))),
    }
}

impl Config {
    /// Validate values that serde alone cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("base_url must be set".into()));
        }
        if let Some(sender) = &self.sender {
            check_mailbox("sender", sender)?;
        }
        for rule in &self.pages {
            let Some(recipients) = &rule.email else {
                continue;
            };
            let addresses = recipients.addresses();
            if addresses.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "page {}: email list must not be empty",
                    rule.page_id
                )));
            }
            for address in addresses {
                check_mailbox(&format!("page {} email", rule.page_id), address)?;
            }
            if self.sender.is_none() {
                return Err(ConfigError::Validation(format!(
                    "page {} has recipients but no sender is configured",
                    rule.page_id
                )));
            }
        }
        Ok(())
    }

    /// Apply command-line overrides on top of file values.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if overrides.quiet {
            self.verbose = false;
        }
    }
}

fn check_mailbox(field: &str, address: &str) -> Result<(), ConfigError> {
    address
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(format!("{field}: invalid address {address:?}: {e}")))
}

/// Settings that come from the command line rather than the document.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub quiet: bool,
}

/// `~/.confluence_reminder.toml`, or a relative path if no home is known.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Parse a config document over stock defaults and validate it.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, then apply command-line overrides.
///
/// The whole document is validated before anything is returned, so a bad
/// config never leads to a partially processed page list.
pub fn load_config(path: &Path, overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let mut config = parse_config(&content)?;
    config.apply(overrides);
    Ok(config)
}

/// Returns a fully-commented stock config document.
///
/// Printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Confluence Reminder Configuration
# =================================
# Save as ~/.confluence_reminder.toml or pass the path with --configfile.
# Unknown keys will cause an error.

# Content REST endpoint. Page ids are appended: {base_url}/{page_id}
base_url = "https://wiki.example.com/rest/api/content"

# From address for reminder mails. Required as soon as any page lists
# recipients.
# sender = "wiki-reminder@example.com"

# Print version, last editor, and page URL for every page.
# --quiet turns all status output off.
verbose = true

# ---------------------------------------------------------------------------
# Mail relay (plain SMTP, no TLS, no authentication)
# ---------------------------------------------------------------------------
[smtp]
host = "localhost"
port = 25

# ---------------------------------------------------------------------------
# Watched pages, checked in this order
# ---------------------------------------------------------------------------
# [[pages]]
# page_id = 42
# max_age = 30          # days since the last change
# email = "owner@example.com"
#
# [[pages]]
# page_id = 4711
# max_age = 90
# email = ["owner@example.com", "team@example.com"]
"##
}
