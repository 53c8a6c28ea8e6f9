//! Flattens a [`Message`] into Elastic Email `email/send` parameters

use slug::slugify;

use crate::domain::communication::{
    email_addresses::Mailbox,
    mailer::{Message, Parameters},
};

/// Only headers starting with this prefix are forwarded to the API.
pub const CUSTOM_HEADER_PREFIX: &str = "X-";

/// The parameters describing `message`: envelope, subject, bodies, and custom headers.
pub(super) fn message_parameters(message: &Message) -> Parameters {
    let mut params = Parameters::new();

    insert_mailbox(&mut params, "from", message.from());
    params.insert("to", recipient_list(message.to()));

    if let Some(sender) = message.sender() {
        insert_mailbox(&mut params, "sender", sender);
    }

    params.insert("subject", message.subject());

    params.insert("bodyHtml", message.html_body().trim());
    if message.format().includes_text() {
        params.insert("bodyText", message.text_body().trim());
    }

    for (name, value) in message.headers() {
        if name.starts_with(CUSTOM_HEADER_PREFIX) && !value.is_empty() {
            params.insert(header_key(name), format!("{name}: {value}"));
        }
    }

    params
}

/// `<field>` gets the address, `<field>Name` the display name when there is a distinct one.
fn insert_mailbox(params: &mut Parameters, field: &str, mailbox: &Mailbox) {
    params.insert(field, mailbox.address().as_str());

    if let Some(name) = mailbox.display_name() {
        params.insert(format!("{field}Name"), name);
    }
}

/// Every address followed by a `;`.
fn recipient_list(recipients: &[Mailbox]) -> String {
    recipients
        .iter()
        .map(|mailbox| format!("{};", mailbox.address()))
        .collect()
}

/// `X-Custom-Tag` becomes `headers_xcustomtag`.
fn header_key(name: &str) -> String {
    format!("headers_{}", slugify(name).replace('-', ""))
}
