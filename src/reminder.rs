//! The reminder run: check every configured page, remind where needed.
//!
//! Pages are processed strictly in configured order and one at a time:
//! fetch, evaluate, notify, report, then the next page. A page that cannot
//! be fetched or whose reminder cannot be sent is reported as failed and the
//! run moves on; the caller decides the exit status from [`RunSummary`].

use crate::config::Config;
use crate::notify::Notifier;
use crate::page::{PageMetadata, PageSource};
use crate::staleness::{Evaluation, evaluate};
use chrono::NaiveDate;
use lettre::Transport;

/// What happened to one configured page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageReport {
    Checked {
        page: PageMetadata,
        evaluation: Evaluation,
        /// `To` header of the reminder, if one was sent.
        notified: Option<String>,
    },
    Failed {
        page_id: u64,
        error: String,
    },
}

/// Counts over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub outdated: usize,
    pub notified: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    fn record(&mut self, report: &PageReport) {
        match report {
            PageReport::Checked {
                evaluation,
                notified,
                ..
            } => {
                self.checked += 1;
                if evaluation.is_outdated() {
                    self.outdated += 1;
                }
                if notified.is_some() {
                    self.notified += 1;
                }
            }
            PageReport::Failed { .. } => self.failed += 1,
        }
    }
}

/// Check all pages in `config` as of `today`.
///
/// `on_report` is called once per page, right after that page is done.
/// Without a notifier, outdated pages are reported but nobody is mailed.
pub fn run<S, T>(
    config: &Config,
    source: &S,
    notifier: Option<&Notifier<T>>,
    today: NaiveDate,
    mut on_report: impl FnMut(&PageReport),
) -> RunSummary
where
    S: PageSource,
    T: Transport,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    let mut summary = RunSummary::default();
    for rule in &config.pages {
        let report = match source.fetch(rule.page_id) {
            Ok(page) => {
                let evaluation = evaluate(&page.last_change, rule.max_age, today);
                let recipients = rule.email.as_ref().filter(|_| evaluation.is_outdated());
                match (recipients, notifier) {
                    (Some(recipients), Some(notifier)) => {
                        match notifier.notify(&page, &evaluation, recipients) {
                            Ok(()) => PageReport::Checked {
                                page,
                                evaluation,
                                notified: Some(recipients.header_value()),
                            },
                            Err(e) => {
                                tracing::error!(page_id = rule.page_id, error = %e, "reminder not sent");
                                PageReport::Failed {
                                    page_id: rule.page_id,
                                    error: e.to_string(),
                                }
                            }
                        }
                    }
                    (Some(_), None) => {
                        tracing::warn!(page_id = rule.page_id, "outdated, but no mailer is configured");
                        PageReport::Checked {
                            page,
                            evaluation,
                            notified: None,
                        }
                    }
                    (None, _) => PageReport::Checked {
                        page,
                        evaluation,
                        notified: None,
                    },
                }
            }
            Err(e) => {
                tracing::error!(page_id = rule.page_id, error = %e, "page check failed");
                PageReport::Failed {
                    page_id: rule.page_id,
                    error: e.to_string(),
                }
            }
        };
        summary.record(&report);
        on_report(&report);
    }
    summary
}
