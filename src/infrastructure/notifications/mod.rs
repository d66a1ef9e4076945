//! Outbound guest notification adapters

mod mailer;

pub use mailer::{LogMailer, MailMessage};
