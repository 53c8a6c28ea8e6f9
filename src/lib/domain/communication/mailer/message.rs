//! Email message

use std::{fmt, str::FromStr};

use crate::domain::communication::email_addresses::Mailbox;

use super::MessageError;

/// Which bodies of a message are meant to be delivered
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EmailFormat {
    /// HTML only
    #[default]
    Html,

    /// Plain text only
    Text,

    /// HTML with a plain text alternative
    Both,
}

impl EmailFormat {
    /// Whether the plain text body is part of this format
    pub fn includes_text(&self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }
}

impl FromStr for EmailFormat {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" => Ok(Self::Text),
            "both" => Ok(Self::Both),
            other => Err(MessageError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for EmailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Text => write!(f, "text"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Email message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    from: Mailbox,
    sender: Option<Mailbox>,
    to: Vec<Mailbox>,
    subject: String,
    format: EmailFormat,
    html_body: String,
    text_body: String,
    headers: Vec<(String, String)>,
}

impl Message {
    /// Start building a message
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// The author of the email
    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    /// The mailbox actually sending on behalf of the author, if different
    pub fn sender(&self) -> Option<&Mailbox> {
        self.sender.as_ref()
    }

    /// The recipients, in the order they were added
    pub fn to(&self) -> &[Mailbox] {
        &self.to
    }

    /// The subject of the email
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The body format
    pub fn format(&self) -> EmailFormat {
        self.format
    }

    /// The HTML body of the email
    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    /// The plain text body of the email
    pub fn text_body(&self) -> &str {
        &self.text_body
    }

    /// Additional headers, in the order they were added
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Builder for [`Message`]
#[derive(Debug, Default, Clone)]
pub struct MessageBuilder {
    from: Option<Mailbox>,
    sender: Option<Mailbox>,
    to: Vec<Mailbox>,
    subject: String,
    format: EmailFormat,
    html_body: String,
    text_body: String,
    headers: Vec<(String, String)>,
}

impl MessageBuilder {
    /// Sets the author
    pub fn from(mut self, from: impl Into<Mailbox>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the sending mailbox
    pub fn sender(mut self, sender: impl Into<Mailbox>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Adds a recipient
    pub fn to(mut self, to: impl Into<Mailbox>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Sets the subject
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the body format
    pub fn format(mut self, format: EmailFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the HTML body
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = html.into();
        self
    }

    /// Sets the plain text body
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text_body = text.into();
        self
    }

    /// Sets a header, replacing any header with the same (case-insensitive) name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();

        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(header) => *header = (name, value),
            None => self.headers.push((name, value)),
        }

        self
    }

    /// Builds the message
    pub fn build(self) -> Result<Message, MessageError> {
        let from = self.from.ok_or(MessageError::MissingFrom)?;

        if self.to.is_empty() {
            return Err(MessageError::MissingRecipients);
        }

        Ok(Message {
            from,
            sender: self.sender,
            to: self.to,
            subject: self.subject,
            format: self.format,
            html_body: self.html_body,
            text_body: self.text_body,
            headers: self.headers,
        })
    }
}
