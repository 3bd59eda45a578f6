//! Shared test utilities for the confluence-reminder test suite.
//!
//! Provides sample page metadata, an in-memory [`PageSource`], and config
//! file setup on temp directories.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = StaticSource::new()
//!     .with_page(sample_page(42, "Handbook", "2024-01-01T00:00:00.000+00:00"))
//!     .with_failure(7);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::page::{FetchError, PageMetadata, PageSource, parse_last_change};

// =========================================================================
// Values
// =========================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Page metadata as the content API would describe it, version 3 by Jane Doe.
pub fn sample_page(id: u64, title: &str, when: &str) -> PageMetadata {
    PageMetadata {
        id,
        title: title.to_string(),
        version: 3,
        reviser: "Jane Doe".to_string(),
        web_url: format!("https://wiki.example.com/pages/viewpage.action?pageId={id}"),
        last_change: parse_last_change(when).unwrap(),
    }
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `content` to `config.toml` in `dir` and return its path.
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

// =========================================================================
// In-memory page source
// =========================================================================

/// Page source backed by a map. Unknown ids fail like a 404 would;
/// ids marked with [`with_failure`](Self::with_failure) fail like a
/// refused connection. Every lookup is recorded.
#[derive(Default)]
pub struct StaticSource {
    pages: HashMap<u64, PageMetadata>,
    failing: Vec<u64>,
    pub requested: std::cell::RefCell<Vec<u64>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: PageMetadata) -> Self {
        self.pages.insert(page.id, page);
        self
    }

    pub fn with_failure(mut self, page_id: u64) -> Self {
        self.failing.push(page_id);
        self
    }
}

impl PageSource for StaticSource {
    fn fetch(&self, page_id: u64) -> Result<PageMetadata, FetchError> {
        self.requested.borrow_mut().push(page_id);
        let url = format!("memory://pages/{page_id}");
        if self.failing.contains(&page_id) {
            return Err(FetchError::Transport {
                url,
                message: "connection refused".to_string(),
            });
        }
        self.pages
            .get(&page_id)
            .cloned()
            .ok_or(FetchError::Status { url, code: 404 })
    }
}
