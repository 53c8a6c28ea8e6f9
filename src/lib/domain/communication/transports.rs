//! Named transports, owned by the application's composition root

use std::{collections::HashMap, fmt, sync::Arc};

use tracing::debug;

use super::mailer::{Delivery, Mailer, MailerError, Message};

/// Maps configuration names to transports
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: HashMap<String, Arc<dyn Mailer>>,
}

impl TransportRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transport under its own name, replacing any previous one.
    pub fn register(&mut self, transport: impl Mailer) -> &mut Self {
        let name = transport.name().to_string();

        self.register_as(name, transport)
    }

    /// Registers a transport under a custom configuration name.
    pub fn register_as(&mut self, name: impl Into<String>, transport: impl Mailer) -> &mut Self {
        let name = name.into();

        debug!(transport = transport.name(), name = %name, "registering transport");

        self.transports.insert(name, Arc::new(transport));
        self
    }

    /// Looks up a transport
    pub fn get(&self, name: &str) -> Option<Arc<dyn Mailer>> {
        self.transports.get(name).cloned()
    }

    /// Sends a message through the transport registered as `name`.
    pub async fn send(&self, name: &str, message: &Message) -> Result<Delivery, MailerError> {
        let transport = self
            .get(name)
            .ok_or_else(|| MailerError::UnknownTransport(name.to_string()))?;

        transport.send(message).await
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.transports.keys().collect();
        names.sort();

        f.debug_struct("TransportRegistry")
            .field("transports", &names)
            .finish()
    }
}
