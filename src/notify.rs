//! Operator email: error reports and heartbeats over SMTP via `lettre`.
//!
//! Delivery failures never escalate: they are written to standard error and
//! the enclosing operation carries on.

use std::path::Path;

use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::EmailSettings;
use crate::error::NotifyError;

const REPORT_SUBJECT: &str = "Bicing ingestion error report";
const REPORT_BODY: &str = "Some errors occurred during ingestion, see attachment for details";
const HEARTBEAT_SUBJECT: &str = "Bicing ingestion heartbeat";
const HEARTBEAT_BODY: &str = "I'm still alive!!!";

/// Something that can deliver a plain-text message to the operator, with an
/// optional single attachment. The production implementation is [`Mailer`];
/// tests substitute stubs.
pub trait Notifier {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> Result<(), NotifyError>;
}

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    admin: Mailbox,
}

impl Mailer {
    pub fn from_config(settings: &EmailSettings) -> Result<Self, NotifyError> {
        let sender: Mailbox = settings
            .sender
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;
        let admin: Mailbox = settings
            .admin
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let transport = if settings.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(settings.smtp_port)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
                .port(settings.smtp_port)
                .build()
        };

        Ok(Self {
            transport,
            sender,
            admin,
        })
    }
}

impl Notifier for Mailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> Result<(), NotifyError> {
        let builder = Message::builder()
            .from(self.sender.clone())
            .to(self.admin.clone())
            .subject(subject);

        let message = match attachment {
            Some(path) => {
                let content = tokio::fs::read(path).await.map_err(NotifyError::Attachment)?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "attachment".to_string());
                let part = Attachment::new(filename).body(content, ContentType::TEXT_PLAIN);
                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(body.to_string()))
                        .singlepart(part),
                )
            }
            None => builder.body(body.to_string()),
        }
        .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        Ok(())
    }
}

/// If the error log exists and is non-empty, mail it to the operator and
/// delete it, so each error burst is reported at most once. A failed send
/// goes to standard error and keeps the log for the next attempt.
pub async fn report_errors<N: Notifier>(notifier: &N, log_file: &Path) {
    let size = match std::fs::metadata(log_file) {
        Ok(meta) => meta.len(),
        // No log file means nothing to report
        Err(_) => return,
    };
    // The logging layer creates the file eagerly at zero size
    if size == 0 {
        return;
    }

    info!("errors found, sending report to admin");
    match notifier
        .send(REPORT_SUBJECT, REPORT_BODY, Some(log_file))
        .await
    {
        Ok(()) => {
            if let Err(e) = std::fs::remove_file(log_file) {
                eprintln!("failed to delete reported error log: {e}");
            }
        }
        Err(e) => eprintln!("failed to send error report: {e}"),
    }
}

/// Best-effort "alive" notification to the operator. Returns whether the
/// send succeeded; callers must not escalate a failure.
pub async fn heartbeat<N: Notifier>(notifier: &N) -> bool {
    match notifier.send(HEARTBEAT_SUBJECT, HEARTBEAT_BODY, None).await {
        Ok(()) => true,
        Err(e) => {
            eprintln!("failed to send heartbeat: {e}");
            false
        }
    }
}
