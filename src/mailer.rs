use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailerConfig;

/// Outbound mail seam. Production uses SMTP; tests and `AppState::fake()`
/// substitute a recording or no-op sender.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &MailerConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)?
            .credentials(Credentials::new(cfg.user.clone(), cfg.pass.clone()))
            .port(cfg.port)
            .build();
        let from = format!("Contacts API <{}>", cfg.user)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid MAILER_USER address: {e}"))?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid recipient address: {e}"))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Build the verification email for a freshly issued (or re-sent) token.
/// Returns `(subject, text, html)`.
pub fn verification_email(base_url: &str, token: &str) -> (String, String, String) {
    let link = verification_link(base_url, token);
    let subject = "Verify your email".to_string();
    let text = format!("Please confirm your email address by opening this link: {link}");
    let html = format!(
        "<p>Please confirm your email address by following the link below:</p>\n\
         <a href=\"{link}\">{link}</a>"
    );
    (subject, text, html)
}

pub fn verification_link(base_url: &str, token: &str) -> String {
    format!("{}/api/auth/verify/{}", base_url.trim_end_matches('/'), token)
}

pub async fn send_verification(
    mailer: &dyn MailSender,
    base_url: &str,
    to: &str,
    token: &str,
) -> anyhow::Result<()> {
    let (subject, text, html) = verification_email(base_url, token);
    mailer.send(to, &subject, &text, &html).await
}
