use async_trait::async_trait;

use crate::user::errors::MailError;
use crate::user::ports::Mailer;

/// Mailer adapter that renders dispatches into the log stream.
///
/// The trigger contract (who gets mailed what, and when) lives in the
/// domain; actual SMTP transport is deployment infrastructure and sits
/// behind this adapter in production setups.
pub struct TracingMailer {
    from_address: String,
}

impl TracingMailer {
    pub fn new(from_address: String) -> Self {
        Self { from_address }
    }
}

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_verification(&self, to: &str, link: &str) -> Result<(), MailError> {
        tracing::info!(
            from = %self.from_address,
            to = %to,
            template = "verify-email",
            link = %link,
            "Mail dispatched"
        );
        Ok(())
    }

    async fn send_login_notice(&self, to: &str) -> Result<(), MailError> {
        tracing::info!(
            from = %self.from_address,
            to = %to,
            template = "login",
            "Mail dispatched"
        );
        Ok(())
    }
}
