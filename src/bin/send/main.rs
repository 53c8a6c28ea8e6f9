#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Send a single email through Elastic Email from the command line

use anyhow::{bail, Context, Result};
use clap::Parser;
use elastic_email_transport::{
    domain::communication::{
        email_addresses::Mailbox,
        mailer::{Delivery, EmailFormat, Message},
        transports::TransportRegistry,
    },
    infrastructure::email::elastic_email::{ElasticEmailConfig, ElasticEmailTransport, SendOptions},
};
use tracing::debug;

const REDACTED: &str = "[redacted]";

/// The message to send
#[derive(Debug, Parser)]
pub struct MessageArgs {
    /// Author, as `addr@example.com` or `Name <addr@example.com>`
    #[clap(long)]
    pub from: Mailbox,

    /// Sending mailbox, when different from the author
    #[clap(long)]
    pub sender: Option<Mailbox>,

    /// Recipient; repeat for several
    #[clap(long, required = true)]
    pub to: Vec<Mailbox>,

    /// Subject line
    #[clap(long, default_value = "")]
    pub subject: String,

    /// HTML body
    #[clap(long, default_value = "")]
    pub html: String,

    /// Plain text body
    #[clap(long, default_value = "")]
    pub text: String,

    /// Body format: html, text or both
    #[clap(long, default_value = "html")]
    pub format: EmailFormat,

    /// Custom header as `X-Name: value`; repeat for several
    #[clap(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

/// Elastic Email specific options
#[derive(Debug, Parser)]
pub struct OptionArgs {
    /// Mark the email as transactional
    #[clap(long)]
    pub transactional: bool,

    /// Template ID from the Elastic Email dashboard
    #[clap(long)]
    pub template: Option<String>,

    /// Minutes to wait before delivery
    #[clap(long)]
    pub schedule: Option<String>,

    /// Template merge variable as `field=value`; repeat for several
    #[clap(long = "merge", value_parser = parse_merge_variable)]
    pub merge_variables: Vec<(String, String)>,
}

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The Elastic Email configuration
    #[clap(flatten)]
    pub elastic_email: ElasticEmailConfig,

    /// The message
    #[clap(flatten)]
    pub message: MessageArgs,

    /// The send options
    #[clap(flatten)]
    pub options: OptionArgs,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {raw:?}"))?;

    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_merge_variable(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `field=value`, got {raw:?}"))?;

    Ok((field.trim().to_string(), value.to_string()))
}

fn build_message(args: MessageArgs) -> Result<Message> {
    let mut builder = Message::builder()
        .from(args.from)
        .subject(args.subject)
        .format(args.format)
        .html_body(args.html)
        .text_body(args.text);

    if let Some(sender) = args.sender {
        builder = builder.sender(sender);
    }

    for to in args.to {
        builder = builder.to(to);
    }

    for (name, value) in args.headers {
        builder = builder.header(name, value);
    }

    builder.build().context("invalid message")
}

fn build_options(args: OptionArgs) -> SendOptions {
    let mut builder = SendOptions::builder().merge_variables(args.merge_variables);

    if args.transactional {
        builder = builder.transactional(true);
    }

    if let Some(template) = args.template {
        builder = builder.template(template);
    }

    if let Some(minutes) = args.schedule {
        builder = builder.schedule_time(minutes);
    }

    builder.build()
}

/// The delivery as shown to the user, with the API key masked
fn printable(delivery: &Delivery) -> Delivery {
    let mut delivery = delivery.clone();

    if delivery.parameters.contains_key("apikey") {
        delivery.parameters.insert("apikey", REDACTED);
    }

    delivery
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let message = build_message(args.message)?;
    let transport =
        ElasticEmailTransport::new(args.elastic_email).with_options(build_options(args.options));

    let mut registry = TransportRegistry::new();
    registry.register(transport);

    let delivery = registry.send(ElasticEmailTransport::NAME, &message).await?;

    debug!(success = delivery.is_success(), "delivery received");

    println!("{}", serde_json::to_string_pretty(&printable(&delivery))?);

    if !delivery.is_success() {
        bail!(
            "Elastic Email rejected the message: {}",
            delivery.error().unwrap_or("no error given")
        );
    }

    Ok(())
}
