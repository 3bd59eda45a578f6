//! # Confluence Reminder
//!
//! Mails reminders about wiki pages that have not been touched for too long.
//! Every configured page has a maximum age in days; pages older than that
//! get a reminder sent to their owners.
//!
//! # Pipeline
//!
//! ```text
//! 1. Config    ~/.confluence_reminder.toml + CLI flags  →  Config
//! 2. Fetch     GET {base_url}/{page_id}                 →  PageMetadata
//! 3. Evaluate  today - last change (days) > max_age?    →  Evaluation
//! 4. Notify    plain + HTML mail via local SMTP relay   (outdated pages only)
//! ```
//!
//! Steps 2–4 run once per page, in configured order, strictly one page at a
//! time. Nothing is stored between runs; schedule the binary with cron.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | TOML loading over stock defaults, CLI overrides, validation |
//! | [`page`] | Content API client and `version.when` timestamp parsing |
//! | [`staleness`] | Calendar-day age and the strict greater-than check |
//! | [`notify`] | Reminder message rendering (Maud) and SMTP delivery (lettre) |
//! | [`reminder`] | The per-page loop and run summary |
//! | [`output`] | Status lines printed for each page |
//!
//! # Design Decisions
//!
//! ## Keep Going After a Failed Page
//!
//! One unreachable page or a relay hiccup should not hide the state of every
//! page after it. Failures are reported per page and turn the exit status
//! to 1 at the end of the run. Config problems are different: they abort
//! before the first request.
//!
//! ## Calendar Days, Not Durations
//!
//! A page changed yesterday evening is one day old this morning. Ages are
//! differences of dates, each taken in its own offset, so the threshold
//! reads the way people count.

pub mod config;
pub mod notify;
pub mod output;
pub mod page;
pub mod reminder;
pub mod staleness;

#[cfg(test)]
pub(crate) mod test_helpers;
