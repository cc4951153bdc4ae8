//! Outbound email seam. The auth service only ever hands a finished
//! message to a `Mailer`; how it is delivered (SMTP relay, API, log) is
//! the implementation's business.

use axum::async_trait;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message or return an error so the caller can surface a
    /// generic server failure.
    async fn send(&self, message: MailMessage) -> anyhow::Result<()>;
}

/// Local dev sender that logs the message instead of talking to a relay.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "mail send (log-only sender)"
        );
        Ok(())
    }
}

/// Verification message carrying the 6-digit code.
pub fn verification_email(to: &str, code: &str) -> MailMessage {
    MailMessage {
        to: to.to_string(),
        subject: "Verify your account".to_string(),
        body: format!(
            "Welcome! Your verification code is {code}. \
             Enter it in the application to complete your registration."
        ),
    }
}

/// Password-reset message embedding the plaintext token in a link.
pub fn reset_email(to: &str, frontend_url: &str, token: &str) -> MailMessage {
    MailMessage {
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        body: format!(
            "You requested a password reset. Follow this link to choose a new \
             password: {frontend_url}/reset-password/{token}"
        ),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_contains_code() {
        let msg = verification_email("ana@x.com", "123456");
        assert_eq!(msg.to, "ana@x.com");
        assert!(msg.body.contains("123456"));
    }

    #[test]
    fn reset_email_links_plaintext_token() {
        let msg = reset_email("ana@x.com", "http://localhost:3000", "deadbeef");
        assert!(msg
            .body
            .contains("http://localhost:3000/reset-password/deadbeef"));
    }
}
