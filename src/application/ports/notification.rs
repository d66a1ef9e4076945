//! Guest notification port
//!
//! [`NotificationPort`] decouples the reservation service from how guests are
//! told about their booking (e-mail, SMS, ...). The service calls it from a
//! detached task after the write has committed, so an implementation may be
//! slow or fail without affecting the booking itself.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ContactInfo, Reservation};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification transport failed: {0}")]
    Transport(String),

    #[error("Recipient rejected: {0}")]
    InvalidRecipient(String),
}

/// Who receives the message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

impl From<&ContactInfo> for Recipient {
    fn from(c: &ContactInfo) -> Self {
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
        }
    }
}

#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn send_confirmation(
        &self,
        recipient: &Recipient,
        reservation: &Reservation,
    ) -> Result<(), NotificationError>;

    async fn send_cancellation(
        &self,
        recipient: &Recipient,
        reservation: &Reservation,
    ) -> Result<(), NotificationError>;
}
