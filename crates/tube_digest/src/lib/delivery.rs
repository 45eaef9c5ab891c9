use std::{future::Future, path::Path, time::Duration};

use anyhow::Context;
use chrono::{DateTime, Utc};
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, AsyncSmtpTransport},
    AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;

pub trait Delivery {
    /// Sends the report at `path` to `recipient`; failures are logged and reported as `false`
    fn send_report(
        &self,
        path: &Path,
        recipient: &str,
        video_count: usize,
    ) -> impl Future<Output = bool> + Send;
}

/// SMTP delivery over STARTTLS with username/password auth
pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailSender {
    pub fn new(config: &EmailConfig, timeout: Duration) -> anyhow::Result<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .with_context(|| format!("invalid SMTP server '{}'", config.smtp_server))?
            .port(config.smtp_port)
            .credentials(creds)
            .timeout(Some(timeout))
            .build();

        let from = config
            .username
            .parse()
            .context("invalid EMAIL_USERNAME address")?;

        Ok(Self { mailer, from })
    }

    async fn try_send(&self, path: &Path, recipient: &str, video_count: usize) -> anyhow::Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read report {}", path.display()))?;
        let to = recipient.parse::<Mailbox>().context("invalid recipient")?;

        let message = build_message(self.from.clone(), to, path, bytes, video_count, Utc::now())?;
        self.mailer.send(message).await.context("send email")?;

        Ok(())
    }
}

impl Delivery for EmailSender {
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    async fn send_report(&self, path: &Path, recipient: &str, video_count: usize) -> bool {
        match self.try_send(path, recipient, video_count).await {
            Ok(()) => {
                tracing::info!("Report emailed");
                true
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to email report");
                false
            }
        }
    }
}

/// Plain-text body plus the PDF as an attachment
pub fn build_message(
    from: Mailbox,
    to: Mailbox,
    path: &Path,
    pdf: Vec<u8>,
    video_count: usize,
    sent_at: DateTime<Utc>,
) -> anyhow::Result<Message> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("report.pdf")
        .to_string();

    let subject = format!("YouTube Podcast Digest - {}", sent_at.format("%Y-%m-%d"));
    let body = format!(
        "Hello,\n\n\
         Attached is your YouTube podcast digest.\n\n\
         Generated at: {} UTC\n\
         Videos summarized: {video_count}\n\n\
         This email was sent automatically by tube-digest.\n",
        sent_at.format("%Y-%m-%d %H:%M:%S"),
    );

    let pdf_type = ContentType::parse("application/pdf").context("pdf content type")?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(Attachment::new(filename).body(pdf, pdf_type)),
        )
        .context("build email")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn message_carries_body_and_pdf_attachment() {
        let sent_at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let message = build_message(
            "me@example.com".parse().unwrap(),
            "you@example.com".parse().unwrap(),
            Path::new("reports/podcast_summary_20261019_080000.pdf"),
            b"%PDF-1.3 fake".to_vec(),
            3,
            sent_at,
        )
        .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: YouTube Podcast Digest - 2026-10-19"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("Content-Type: application/pdf"));
        assert!(raw.contains("podcast_summary_20261019_080000.pdf"));
        assert!(raw.contains("Videos summarized: 3"));
        assert!(raw.contains("To: you@example.com"));
    }

    #[tokio::test]
    async fn missing_report_file_is_reported_as_failure() {
        let config = EmailConfig {
            smtp_server: "localhost".into(),
            smtp_port: 2525,
            username: "me@example.com".into(),
            password: "secret".into(),
            to: "you@example.com".into(),
        };
        let sender = EmailSender::new(&config, Duration::from_secs(1)).unwrap();

        let delivered = sender
            .send_report(Path::new("/nonexistent/report.pdf"), &config.to, 1)
            .await;
        assert!(!delivered);
    }
}
