//! Elastic Email HTTP API transport

mod errors;
mod options;
mod request;

use std::fmt;

use async_trait::async_trait;
use clap::Parser;
use reqwest::Client;
use tracing::{debug, info};

use crate::domain::communication::mailer::{Delivery, Mailer, MailerError, Message, Parameters};

pub use errors::ElasticEmailError;
pub use options::{is_numeric, SendOptions, SendOptionsBuilder, MAX_SCHEDULE_MINUTES};
pub use request::CUSTOM_HEADER_PREFIX;

/// The default Elastic Email API base URL
pub const DEFAULT_API_ENDPOINT: &str = "https://api.elasticemail.com/v2";

/// Elastic Email configuration
#[derive(Clone, Parser)]
pub struct ElasticEmailConfig {
    /// The Elastic Email API key
    #[clap(long, env = "ELASTIC_EMAIL_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// The Elastic Email API base URL
    #[clap(long, env = "ELASTIC_EMAIL_API_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,
}

impl ElasticEmailConfig {
    /// Configuration for the public API endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
        }
    }

    /// Points the transport at another base URL
    pub fn with_endpoint(mut self, api_endpoint: impl Into<String>) -> Self {
        self.api_endpoint = api_endpoint.into();
        self
    }
}

impl Default for ElasticEmailConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for ElasticEmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElasticEmailConfig")
            .field("api_key", &"[redacted]")
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}

/// Sends messages through the Elastic Email `email/send` endpoint.
///
/// The transport keeps no per-message state: every send starts from an
/// empty parameter set built from the message and the [`SendOptions`] in
/// effect, either the ones given to [`ElasticEmailTransport::send_with`]
/// or the transport's own defaults.
#[derive(Debug, Clone)]
pub struct ElasticEmailTransport {
    config: ElasticEmailConfig,
    options: SendOptions,
    http_client: Client,
}

impl ElasticEmailTransport {
    /// The name the transport registers under
    pub const NAME: &'static str = "elasticemail";

    /// Create a new Elastic Email transport
    pub fn new(config: ElasticEmailConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a new Elastic Email transport with a preconfigured HTTP client
    pub fn with_client(config: ElasticEmailConfig, http_client: Client) -> Self {
        Self {
            config,
            options: SendOptions::default(),
            http_client,
        }
    }

    /// Applies `options` to every message sent through [`Mailer::send`]
    pub fn with_options(mut self, options: SendOptions) -> Self {
        self.options = options;
        self
    }

    /// The full URL messages are posted to
    pub fn send_url(&self) -> String {
        format!("{}/email/send", self.config.api_endpoint.trim_end_matches('/'))
    }

    /// The parameters a send of `message` with `options` would post.
    ///
    /// # Errors
    /// [`ElasticEmailError::MissingApiKey`] if no API key is configured.
    pub fn parameters(
        &self,
        message: &Message,
        options: &SendOptions,
    ) -> Result<Parameters, ElasticEmailError> {
        if self.config.api_key.is_empty() {
            return Err(ElasticEmailError::MissingApiKey);
        }

        let mut params = Parameters::new();

        params.insert("apikey", self.config.api_key.as_str());
        params.extend(&request::message_parameters(message));
        params.extend(&options.parameters());

        debug!(count = params.len(), "prepared Elastic Email parameters");

        Ok(params)
    }

    /// Sends `message` with `options` applied.
    ///
    /// A rejection by the API is not an error: inspect
    /// [`Delivery::is_success`] and [`Delivery::error`]. A body that is not
    /// JSON leaves [`Delivery::response`] as [`serde_json::Value::Null`].
    ///
    /// # Errors
    /// - [`ElasticEmailError::MissingApiKey`] before any request is made.
    /// - [`ElasticEmailError::Transport`] if the request fails.
    pub async fn send_with(
        &self,
        message: &Message,
        options: &SendOptions,
    ) -> Result<Delivery, ElasticEmailError> {
        let parameters = self.parameters(message, options)?;
        let url = self.send_url();

        info!(url = %url, recipients = message.to().len(), "sending email through Elastic Email");

        let response = self
            .http_client
            .post(&url)
            .form(&parameters.to_form())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        debug!(%status, "Elastic Email responded");

        let response = serde_json::from_slice(&body).unwrap_or_else(|e| {
            debug!(%status, error = %e, "Elastic Email response is not JSON");
            serde_json::Value::Null
        });

        Ok(Delivery {
            response,
            parameters,
        })
    }
}

#[async_trait]
impl Mailer for ElasticEmailTransport {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn send(&self, message: &Message) -> Result<Delivery, MailerError> {
        Ok(self.send_with(message, &self.options).await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;
    use wiremock::{
        matchers::{body_string_contains, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::domain::communication::{
        email_addresses::{EmailAddress, Mailbox},
        mailer::{EmailFormat, MessageError, ParameterValue},
        transports::TransportRegistry,
    };

    use super::*;

    fn message() -> Result<Message, MessageError> {
        Message::builder()
            .from(Mailbox::with_name(
                EmailAddress::new("from@example.com")?,
                "Elastic Sender",
            ))
            .to(EmailAddress::new("to@example.com")?)
            .subject("Hello")
            .format(EmailFormat::Both)
            .html_body("<p>Hello</p>")
            .text_body("Hello")
            .header("X-Custom-Tag", "value1")
            .build()
    }

    fn transport(server: &MockServer, api_key: &str) -> ElasticEmailTransport {
        ElasticEmailTransport::new(ElasticEmailConfig::new(api_key).with_endpoint(server.uri()))
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = transport(&server, "")
            .send_with(&message()?, &SendOptions::default())
            .await;

        assert!(matches!(result, Err(ElasticEmailError::MissingApiKey)));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_api_key_through_mailer() -> TestResult {
        let server = MockServer::start().await;

        let err = Mailer::send(&transport(&server, ""), &message()?)
            .await
            .expect_err("send should fail without an api key");

        assert!(matches!(err, MailerError::Configuration(_)));
        assert_eq!(err.to_string(), "Api Key for Elastic Email could not be found.");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_posts_form_to_email_send() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/email/send"))
            .and(body_string_contains("apikey=secret"))
            .and(body_string_contains("fromName=Elastic+Sender"))
            .and(body_string_contains("to=to%40example.com%3B"))
            .and(body_string_contains("headers_xcustomtag=X-Custom-Tag%3A+value1"))
            .and(body_string_contains("isTransactional=true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"transactionid": "t-1", "messageid": "m-1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = SendOptions::builder().transactional(true).build();

        let delivery = transport(&server, "secret")
            .send_with(&message()?, &options)
            .await?;

        assert!(delivery.is_success());
        assert_eq!(
            delivery.parameters.get("apikey"),
            Some(&ParameterValue::from("secret"))
        );
        assert_eq!(
            delivery.parameters.get("isTransactional"),
            Some(&ParameterValue::Bool(true))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_api_rejection_is_returned_not_raised() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/email/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "Incorrect apikey"
            })))
            .mount(&server)
            .await;

        let delivery = Mailer::send(&transport(&server, "wrong"), &message()?).await?;

        assert!(!delivery.is_success());
        assert_eq!(delivery.error(), Some("Incorrect apikey"));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_json_response_is_returned_in_delivery() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503).set_body_string("<html>Service Unavailable</html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let delivery = transport(&server, "secret")
            .send_with(&message()?, &SendOptions::default())
            .await?;

        assert_eq!(delivery.response, serde_json::Value::Null);
        assert!(!delivery.is_success());
        assert_eq!(delivery.error(), None);
        assert!(delivery.parameters.contains_key("apikey"));

        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() -> TestResult {
        let server = MockServer::start().await;
        let transport = transport(&server, "secret");

        drop(server);

        let result = transport.send_with(&message()?, &SendOptions::default()).await;

        assert!(matches!(result, Err(ElasticEmailError::Transport(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_options_do_not_leak_into_the_next_send() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(2)
            .mount(&server)
            .await;

        let transport = transport(&server, "secret");
        let options = SendOptions::builder()
            .template(42)
            .schedule_time(60)
            .merge_variable("firstname", "Foo")
            .build();

        let first = transport.send_with(&message()?, &options).await?;
        let second = Mailer::send(&transport, &message()?).await?;

        assert!(first.parameters.contains_key("template"));
        assert!(first.parameters.contains_key("merge_firstname"));
        assert!(!second.parameters.contains_key("template"));
        assert!(!second.parameters.contains_key("timeOffSetMinutes"));
        assert!(!second.parameters.contains_key("merge_firstname"));

        Ok(())
    }

    #[tokio::test]
    async fn test_mailer_send_applies_transport_options() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("template=42"))
            .and(body_string_contains("merge_firstname=Foo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(2)
            .mount(&server)
            .await;

        let transport = transport(&server, "secret").with_options(
            SendOptions::builder()
                .template(42)
                .merge_variable("firstname", "Foo")
                .build(),
        );

        let first = Mailer::send(&transport, &message()?).await?;
        let second = Mailer::send(&transport, &message()?).await?;

        assert_eq!(first.parameters, second.parameters);

        Ok(())
    }

    #[tokio::test]
    async fn test_send_through_registry() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/email/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut registry = TransportRegistry::new();
        registry.register(transport(&server, "secret"));

        let delivery = registry
            .send(ElasticEmailTransport::NAME, &message()?)
            .await?;

        assert!(delivery.is_success());

        Ok(())
    }

    #[test]
    fn test_parameters_without_network() -> TestResult {
        let transport = ElasticEmailTransport::new(ElasticEmailConfig::new("secret"));

        let params = transport.parameters(
            &message()?,
            &SendOptions::builder().template("not a number").build(),
        )?;

        let keys: Vec<&str> = params.iter().map(|(key, _)| key).collect();

        assert_eq!(
            keys,
            vec![
                "apikey",
                "from",
                "fromName",
                "to",
                "subject",
                "bodyHtml",
                "bodyText",
                "headers_xcustomtag",
            ]
        );

        Ok(())
    }

    #[test]
    fn test_send_url_ignores_trailing_slash() {
        let transport = ElasticEmailTransport::new(
            ElasticEmailConfig::new("secret").with_endpoint("http://localhost:8080/v2/"),
        );

        assert_eq!(transport.send_url(), "http://localhost:8080/v2/email/send");
    }

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = ElasticEmailConfig::new("super-secret");

        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
