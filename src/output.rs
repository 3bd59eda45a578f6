//! CLI status output for a reminder run.
//!
//! One block per configured page, printed as soon as the page is done:
//!
//! ```text
//! Team Handbook
//!   Version 17 by Jane Doe
//!   https://wiki.example.com/display/TEAM/Team+Handbook
//!   Page age: 60 days. Max age is 30 days.
//!   This page has to be updated.
//!   Reminder sent to a@x.com, b@x.com
//! Release Checklist
//!   Page age: 3 days. Max age is 14 days.
//!   This page is up to date.
//! Page 4711: https://wiki.example.com/api/4711 returned HTTP 404
//! ```
//!
//! The version and URL lines only appear in verbose mode.
//!
//! `format_*` functions return lines and do no I/O; `print_*` wrappers write
//! them to stdout.

use crate::reminder::{PageReport, RunSummary};

fn detail(text: impl std::fmt::Display) -> String {
    format!("  {}", text)
}

/// Lines describing one page's result.
pub fn format_page_report(report: &PageReport, verbose: bool) -> Vec<String> {
    match report {
        PageReport::Checked {
            page,
            evaluation,
            notified,
        } => {
            let mut lines = vec![page.title.clone()];
            if verbose {
                lines.push(detail(format!("Version {} by {}", page.version, page.reviser)));
                lines.push(detail(&page.web_url));
            }
            lines.push(detail(format!(
                "Page age: {} days. Max age is {} days.",
                evaluation.age_days, evaluation.max_age
            )));
            if evaluation.is_outdated() {
                lines.push(detail("This page has to be updated."));
            } else {
                lines.push(detail("This page is up to date."));
            }
            if let Some(to) = notified {
                lines.push(detail(format!("Reminder sent to {}", to)));
            }
            lines
        }
        PageReport::Failed { page_id, error } => vec![format!("Page {}: {}", page_id, error)],
    }
}

/// Closing line, only shown when something went wrong.
pub fn format_summary(summary: &RunSummary) -> Option<String> {
    summary.has_failures().then(|| {
        format!(
            "{} of {} pages could not be checked or reminded",
            summary.failed,
            summary.failed + summary.checked
        )
    })
}

pub fn print_page_report(report: &PageReport, verbose: bool) {
    for line in format_page_report(report, verbose) {
        println!("{}", line);
    }
}
