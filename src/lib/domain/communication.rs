//! Outgoing email: addresses, messages, and the transports that deliver them

pub mod email_addresses;
pub mod mailer;
pub mod transports;
