//! Page metadata retrieval.
//!
//! Each watched page is looked up with a single `GET {base_url}/{page_id}`
//! against the content REST API. Only a handful of fields are read from the
//! response:
//!
//! ```text
//! title                   → PageMetadata::title
//! version.number          → PageMetadata::version
//! version.by.displayName  → PageMetadata::reviser
//! _links.base + webui     → PageMetadata::web_url
//! version.when            → PageMetadata::last_change
//! ```
//!
//! ## Timestamps
//!
//! `version.when` looks like `2016-09-30T15:06:29.902+02:00`. The offset is
//! rewritten to `+0200` before parsing with `%z`; anything that still does
//! not match (e.g. a `Z` suffix) goes through the RFC 3339 parser instead.
//!
//! Requests are blocking and never retried. A non-2xx status is an error.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::borrow::Cow;
use thiserror::Error;

const WHEN_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{url} returned HTTP {code}")]
    Status { url: String, code: u16 },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },
}

/// What the reminder needs to know about a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub id: u64,
    pub title: String,
    pub version: u32,
    /// Display name of whoever made the last change.
    pub reviser: String,
    /// Browser URL of the page.
    pub web_url: String,
    pub last_change: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
struct ContentResponse {
    title: String,
    version: VersionInfo,
    #[serde(rename = "_links")]
    links: Links,
}

#[derive(Deserialize)]
struct VersionInfo {
    number: u32,
    by: Person,
    when: String,
}

#[derive(Deserialize)]
struct Person {
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Deserialize)]
struct Links {
    base: String,
    webui: String,
}

impl PageMetadata {
    /// Build metadata from a content API response body.
    pub fn from_json(id: u64, body: &str) -> Result<Self, FetchError> {
        let response: ContentResponse = serde_json::from_str(body)?;
        let last_change = parse_last_change(&response.version.when)?;
        Ok(Self {
            id,
            title: response.title,
            version: response.version.number,
            reviser: response.version.by.display_name,
            web_url: format!("{}{}", response.links.base, response.links.webui),
            last_change,
        })
    }
}

/// Drop the colon from a trailing `±HH:MM` offset so `%z` accepts it.
pub fn normalize_offset(when: &str) -> Cow<'_, str> {
    let bytes = when.as_bytes();
    let n = bytes.len();
    if n >= 6 && bytes[n - 3] == b':' && matches!(bytes[n - 6], b'+' | b'-') {
        Cow::Owned(format!("{}{}", &when[..n - 3], &when[n - 2..]))
    } else {
        Cow::Borrowed(when)
    }
}

/// Parse a `version.when` value into a timezone-aware timestamp.
pub fn parse_last_change(when: &str) -> Result<DateTime<FixedOffset>, FetchError> {
    let normalized = normalize_offset(when);
    DateTime::parse_from_str(&normalized, WHEN_FORMAT)
        .or_else(|first| DateTime::parse_from_rfc3339(when).map_err(|_| first))
        .map_err(|source| FetchError::Timestamp {
            value: when.to_string(),
            source,
        })
}

/// Where page metadata comes from.
///
/// The production implementation is [`HttpPageSource`]; tests substitute an
/// in-memory source.
pub trait PageSource {
    fn fetch(&self, page_id: u64) -> Result<PageMetadata, FetchError>;
}

/// Content REST API client.
pub struct HttpPageSource {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.into(),
        }
    }

    /// `{base_url}/{page_id}` without doubling a trailing slash.
    pub fn page_url(&self, page_id: u64) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), page_id)
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, page_id: u64) -> Result<PageMetadata, FetchError> {
        let url = self.page_url(page_id);
        tracing::debug!(%url, "fetching page metadata");
        let response = match self.agent.get(&url).set("Accept", "application/json").call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status { url, code }),
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Transport {
                    url,
                    message: transport.to_string(),
                });
            }
        };
        let body = response.into_string()?;
        PageMetadata::from_json(page_id, &body)
    }
}
