//! Mail adapter for the notification port
//!
//! Renders the guest e-mail and hands it to the log. Delivery through a
//! real SMTP relay plugs in behind the same `NotificationPort`.

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{NotificationError, NotificationPort, Recipient};
use crate::domain::Reservation;
use crate::shared::is_plausible_email;

/// A rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub struct LogMailer {
    from_address: String,
    enabled: bool,
}

impl LogMailer {
    pub fn new(from_address: impl Into<String>, enabled: bool) -> Self {
        Self {
            from_address: from_address.into(),
            enabled,
        }
    }

    pub fn render_confirmation(
        &self,
        recipient: &Recipient,
        reservation: &Reservation,
    ) -> MailMessage {
        let body = format!(
            "Hello {},\n\nyour reservation {} for {} guest(s) is {}.\nFrom: {}\nUntil: {}\n",
            recipient.name,
            reservation.id,
            reservation.number_of_guests,
            reservation.status.as_str().to_lowercase(),
            reservation.start_at().format("%Y-%m-%d %H:%M UTC"),
            reservation.end_at().format("%Y-%m-%d %H:%M UTC"),
        );
        MailMessage {
            from: self.from_address.clone(),
            to: recipient.email.clone(),
            subject: format!("Reservation {}", reservation.status.as_str().to_lowercase()),
            body,
        }
    }

    pub fn render_cancellation(
        &self,
        recipient: &Recipient,
        reservation: &Reservation,
    ) -> MailMessage {
        let body = format!(
            "Hello {},\n\nyour reservation {} on {} has been cancelled.\n",
            recipient.name,
            reservation.id,
            reservation.start_at().format("%Y-%m-%d %H:%M UTC"),
        );
        MailMessage {
            from: self.from_address.clone(),
            to: recipient.email.clone(),
            subject: "Reservation cancelled".to_string(),
            body,
        }
    }

    fn deliver(&self, message: MailMessage) -> Result<(), NotificationError> {
        if !is_plausible_email(&message.to) {
            return Err(NotificationError::InvalidRecipient(message.to));
        }
        if !self.enabled {
            return Ok(());
        }
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "📧 Mail sent"
        );
        Ok(())
    }
}

#[async_trait]
impl NotificationPort for LogMailer {
    async fn send_confirmation(
        &self,
        recipient: &Recipient,
        reservation: &Reservation,
    ) -> Result<(), NotificationError> {
        self.deliver(self.render_confirmation(recipient, reservation))
    }

    async fn send_cancellation(
        &self,
        recipient: &Recipient,
        reservation: &Reservation,
    ) -> Result<(), NotificationError> {
        self.deliver(self.render_cancellation(recipient, reservation))
    }
}
