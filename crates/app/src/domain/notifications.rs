//! Notifications
//!
//! Delivery of OTP codes to a signer's registered email. Delivery is best effort:
//! a failed send never fails issuance, and never counts as verification.

use async_trait::async_trait;
use creator_deals::{deals::Deal, signatures::SignerRole};
use mockall::automock;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::otp::OtpCode;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },
}

#[automock]
#[async_trait]
/// Channel that delivers OTP codes.
pub trait Notifier: Send + Sync {
    /// Send `code` for `deal` to the signer at `recipient`.
    async fn send(
        &self,
        role: SignerRole,
        recipient: &str,
        code: &OtpCode,
        deal: &Deal,
    ) -> Result<(), NotifyError>;
}

/// Notifier for local development: writes deliveries to the log.
///
/// The code itself is only emitted at `debug` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        role: SignerRole,
        recipient: &str,
        code: &OtpCode,
        deal: &Deal,
    ) -> Result<(), NotifyError> {
        info!(
            deal = %deal.id,
            role = %role,
            recipient = %mask_email(recipient),
            "OTP delivery queued"
        );

        debug!(deal = %deal.id, role = %role, code = code.expose(), "OTP code");

        Ok(())
    }
}

/// Keep the first character of the local part and the whole domain.
pub fn mask_email(email: &str) -> String {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();

            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_email("asha@example.in"), "a***@example.in");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() -> TestResult {
        LogNotifier
            .send(
                SignerRole::Brand,
                "legal@glow.example.com",
                &OtpCode::generate(),
                &Deal::default(),
            )
            .await?;

        Ok(())
    }
}
