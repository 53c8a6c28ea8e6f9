//! Mailer module

mod errors;
mod message;
mod parameters;

use async_trait::async_trait;
use serde::Serialize;

pub use errors::{MailerError, MessageError};
pub use message::{EmailFormat, Message, MessageBuilder};
pub use parameters::{ParameterValue, Parameters};

#[cfg(test)]
use mockall::mock;

/// The outcome of handing a message to a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    /// The decoded response body returned by the provider
    pub response: serde_json::Value,

    /// The parameters that were sent to the provider
    pub parameters: Parameters,
}

impl Delivery {
    /// Whether the provider reported `"success": true`.
    pub fn is_success(&self) -> bool {
        self.response
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// The provider's error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.response.get("error").and_then(serde_json::Value::as_str)
    }
}

/// Email transport
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// The name the transport is registered under
    fn name(&self) -> &'static str;

    /// Send an email
    ///
    /// # Arguments
    /// * `message` - The [`Message`] to send.
    ///
    /// # Returns
    /// - [`Ok`] with the [`Delivery`] if the provider answered, even when it rejected the message.
    /// - [`Err`] containing a [`MailerError`] if the message could not be handed over.
    async fn send(&self, message: &Message) -> Result<Delivery, MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        fn name(&self) -> &'static str;
        async fn send(&self, message: &Message) -> Result<Delivery, MailerError>;
    }
}
