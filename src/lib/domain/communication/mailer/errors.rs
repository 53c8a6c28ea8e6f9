//! Mailer errors

use thiserror::Error;

use crate::domain::communication::email_addresses::EmailAddressError;

/// Errors that can occur when building a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// No from address was given
    #[error("a message needs a from address")]
    MissingFrom,

    /// No recipient was given
    #[error("a message needs at least one recipient")]
    MissingRecipients,

    /// The body format is not one of `html`, `text` or `both`
    #[error("unknown email format \"{0}\"")]
    UnknownFormat(String),

    /// An address could not be parsed
    #[error(transparent)]
    InvalidAddress(#[from] EmailAddressError),
}

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// The transport is missing a required setting
    #[error("{0}")]
    Configuration(String),

    /// The request to the provider failed
    #[error("An error occurred while sending the email")]
    SendError(#[source] anyhow::Error),

    /// No transport is registered under the given name
    #[error("no transport registered as \"{0}\"")]
    UnknownTransport(String),
}
