//! Reminder mails for outdated pages.
//!
//! Each reminder is a `multipart/alternative` message with a plain-text part
//! and an HTML part rendered with [maud](https://maud.lambda.xyz/). Both
//! carry the page title, the time of the last change, the page age, the
//! last editor, and the page URL.
//!
//! Mail goes out through any [`lettre::Transport`]. Production uses
//! [`SmtpTransport`] against a local relay: plain SMTP on the configured
//! port, no TLS, no authentication.

use crate::config::{Config, Recipients};
use crate::page::PageMetadata;
use crate::staleness::Evaluation;
use lettre::message::{Mailbox, MultiPart};
use lettre::{Message, SmtpTransport, Transport};
use maud::{DOCTYPE, Markup, html};
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M %:z";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("failed to send mail: {0}")]
    Send(Box<dyn std::error::Error + Send + Sync>),
}

pub fn subject(page: &PageMetadata) -> String {
    format!("Wiki page outdated: {}", page.title)
}

pub fn plain_body(page: &PageMetadata, evaluation: &Evaluation) -> String {
    format!(
        "Hello,\n\
         \n\
         the wiki page \"{title}\" has not been updated for {age} days \
         (allowed: {max_age} days).\n\
         \n\
         Last change: {when} by {reviser} (version {version})\n\
         \n\
         Please review the page and bring it up to date:\n\
         {url}\n",
        title = page.title,
        age = evaluation.age_days,
        max_age = evaluation.max_age,
        when = page.last_change.format(TIMESTAMP_FORMAT),
        reviser = page.reviser,
        version = page.version,
        url = page.web_url,
    )
}

pub fn html_body(page: &PageMetadata, evaluation: &Evaluation) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                title { (subject(page)) }
            }
            body {
                p { "Hello," }
                p {
                    "the wiki page "
                    a href=(page.web_url) { (page.title) }
                    " has not been updated for "
                    strong { (evaluation.age_days) " days" }
                    " (allowed: " (evaluation.max_age) " days)."
                }
                p {
                    "Last change: " (page.last_change.format(TIMESTAMP_FORMAT).to_string())
                    " by " (page.reviser) " (version " (page.version) ")"
                }
                p {
                    "Please review the page and bring it up to date: "
                    a href=(page.web_url) { (page.web_url) }
                }
            }
        }
    }
}

/// Builds reminder messages and hands them to a mail transport.
pub struct Notifier<T> {
    transport: T,
    sender: Mailbox,
}

impl<T> Notifier<T> {
    pub fn new(transport: T, sender: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            transport,
            sender: sender.parse()?,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Assemble the reminder for one outdated page.
    ///
    /// Recipients keep their configured order, so the `To` header reads
    /// exactly like [`Recipients::header_value`].
    pub fn message(
        &self,
        page: &PageMetadata,
        evaluation: &Evaluation,
        recipients: &Recipients,
    ) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .subject(subject(page));
        for address in recipients.addresses() {
            builder = builder.to(address.parse::<Mailbox>()?);
        }
        let message = builder.multipart(MultiPart::alternative_plain_html(
            plain_body(page, evaluation),
            html_body(page, evaluation).into_string(),
        ))?;
        Ok(message)
    }
}

impl<T> Notifier<T>
where
    T: Transport,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn notify(
        &self,
        page: &PageMetadata,
        evaluation: &Evaluation,
        recipients: &Recipients,
    ) -> Result<(), NotifyError> {
        let message = self.message(page, evaluation, recipients)?;
        self.transport
            .send(&message)
            .map_err(|e| NotifyError::Send(Box::new(e)))?;
        tracing::info!(
            page_id = page.id,
            to = %recipients.header_value(),
            "sent reminder"
        );
        Ok(())
    }
}

/// SMTP notifier for the configured relay, or `None` without a sender.
pub fn smtp_notifier(config: &Config) -> Result<Option<Notifier<SmtpTransport>>, NotifyError> {
    let Some(sender) = &config.sender else {
        return Ok(None);
    };
    let transport = SmtpTransport::builder_dangerous(config.smtp.host.as_str())
        .port(config.smtp.port)
        .build();
    Notifier::new(transport, sender).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staleness::evaluate;
    use crate::test_helpers::{date, sample_page};
    use lettre::transport::stub::StubTransport;

    fn outdated() -> (PageMetadata, Evaluation) {
        let page = sample_page(42, "Team Handbook", "2024-01-01T00:00:00.000+00:00");
        let evaluation = evaluate(&page.last_change, 30, date(2024, 3, 1));
        (page, evaluation)
    }

    #[test]
    fn subject_contains_title() {
        let (page, _) = outdated();
        assert_eq!(subject(&page), "Wiki page outdated: Team Handbook");
    }

    #[test]
    fn plain_body_mentions_page_details() {
        let (page, evaluation) = outdated();
        let body = plain_body(&page, &evaluation);
        assert!(body.contains("\"Team Handbook\""));
        assert!(body.contains("for 60 days (allowed: 30 days)"));
        assert!(body.contains("Last change: 2024-01-01 00:00 +00:00 by Jane Doe (version 3)"));
        assert!(body.contains(&page.web_url));
    }

    #[test]
    fn html_body_links_page() {
        let (page, evaluation) = outdated();
        let html = html_body(&page, &evaluation).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(&format!("<a href=\"{}\">Team Handbook</a>", page.web_url)));
        assert!(html.contains("<strong>60 days</strong>"));
    }

    #[test]
    fn html_body_escapes_title() {
        let (mut page, evaluation) = outdated();
        page.title = "Q&A <draft>".to_string();
        let html = html_body(&page, &evaluation).into_string();
        assert!(html.contains("Q&amp;A &lt;draft&gt;"));
        assert!(!html.contains("<draft>"));
    }

    #[test]
    fn invalid_sender_rejected() {
        let result = Notifier::new(StubTransport::new_ok(), "not an address");
        assert!(matches!(result, Err(NotifyError::Address(_))));
    }

    #[test]
    fn notify_single_recipient() {
        let (page, evaluation) = outdated();
        let notifier = Notifier::new(StubTransport::new_ok(), "reminder@example.com").unwrap();
        notifier
            .notify(&page, &evaluation, &Recipients::One("a@x.com".into()))
            .unwrap();

        let sent = notifier.transport().messages();
        assert_eq!(sent.len(), 1);
        let (envelope, raw) = &sent[0];
        let to: Vec<String> = envelope.to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["a@x.com"]);
        assert!(raw.contains("Subject: Wiki page outdated: Team Handbook"));
        assert!(raw.contains("From: reminder@example.com"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn notify_recipient_list_joins_to_header() {
        let (page, evaluation) = outdated();
        let notifier = Notifier::new(StubTransport::new_ok(), "reminder@example.com").unwrap();
        let recipients = Recipients::Many(vec!["a@x.com".into(), "b@x.com".into()]);
        notifier.notify(&page, &evaluation, &recipients).unwrap();

        let sent = notifier.transport().messages();
        let (envelope, raw) = &sent[0];
        let to: Vec<String> = envelope.to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["a@x.com", "b@x.com"]);
        assert!(raw.contains("To: a@x.com, b@x.com"), "{raw}");
    }

    #[test]
    fn transport_failure_is_send_error() {
        let (page, evaluation) = outdated();
        let notifier = Notifier::new(StubTransport::new_error(), "reminder@example.com").unwrap();
        let result = notifier.notify(&page, &evaluation, &Recipients::One("a@x.com".into()));
        assert!(matches!(result, Err(NotifyError::Send(_))));
    }

    #[test]
    fn smtp_notifier_requires_sender() {
        let config = Config::default();
        assert!(smtp_notifier(&config).unwrap().is_none());

        let config = Config {
            sender: Some("reminder@example.com".into()),
            ..Config::default()
        };
        assert!(smtp_notifier(&config).unwrap().is_some());
    }
}
