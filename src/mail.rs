use lettre::message::header::ContentType;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;

/// Best-effort mail notifications.
///
/// Sending is fire-and-forget: when mail is deactivated in the configuration
/// a warning is logged and nothing happens; transport errors are logged and
/// swallowed. No caller ever fails because a notification could not be sent.
#[derive(Clone)]
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub async fn send(&self, subject: &str, body: &str) {
        if !self.config.activated {
            tracing::warn!("send: Mail deaktiviert");
            return;
        }

        if let Err(e) = self.try_send(subject, body).await {
            tracing::warn!("send: Mailversand fehlgeschlagen: {}", e);
        }
    }

    async fn try_send(&self, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.config.from.parse()?)
            .to(self.config.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())?;

        let transport: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.config.host.as_str())
                .port(self.config.port)
                .build();

        transport.send(message).await?;
        tracing::debug!("try_send: subject={}", subject);
        Ok(())
    }
}
