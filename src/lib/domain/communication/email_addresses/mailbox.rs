//! Mailbox: an email address with an optional display name

use std::{fmt, str::FromStr};

use tracing::debug;

use super::{EmailAddress, EmailAddressError};

/// An email address with an optional display name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mailbox {
    address: EmailAddress,
    name: Option<String>,
}

impl Mailbox {
    /// Create a mailbox without a display name
    pub fn new(address: EmailAddress) -> Self {
        Self {
            address,
            name: None,
        }
    }

    /// Create a mailbox with a display name
    pub fn with_name(address: EmailAddress, name: impl Into<String>) -> Self {
        Self {
            address,
            name: Some(name.into()),
        }
    }

    /// The mailbox address
    pub fn address(&self) -> &EmailAddress {
        &self.address
    }

    /// The display name, if one was given and it is not just the address repeated.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| *name != self.address.as_str())
    }
}

impl From<EmailAddress> for Mailbox {
    fn from(address: EmailAddress) -> Self {
        Self::new(address)
    }
}

impl FromStr for Mailbox {
    type Err = EmailAddressError;

    /// Parses `addr@example.com` or `Display Name <addr@example.com>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: lettre::message::Mailbox = s.trim().parse().map_err(|err| {
            debug!("AddressError -> EmailAddressError: {err}");

            EmailAddressError::InvalidEmailAddress(s.trim().to_string())
        })?;

        let address = EmailAddress::new(parsed.email.as_ref())?;

        Ok(match parsed.name {
            Some(name) if !name.is_empty() => Self::with_name(address, name),
            _ => Self::new(address),
        })
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_name() {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}
