use async_trait::async_trait;

use crate::domain::auth::ports::MailError;
use crate::domain::auth::ports::Mailer;

/// Development mailer: records the delivery in the log instead of
/// talking to a relay. The [`Mailer`] port is the seam where an SMTP
/// adapter plugs in for production.
pub struct LogMailer {
    from_email: String,
    from_name: String,
}

impl LogMailer {
    pub fn new(from_email: String, from_name: String) -> Self {
        Self {
            from_email,
            from_name,
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        tracing::info!(
            from = %format!("{} <{}>", self.from_name, self.from_email),
            to,
            subject,
            body_bytes = html_body.len(),
            "outgoing mail"
        );
        Ok(())
    }
}
