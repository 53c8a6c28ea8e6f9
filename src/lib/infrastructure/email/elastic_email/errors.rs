//! Elastic Email transport errors

use thiserror::Error;
use tracing::debug;

use crate::domain::communication::mailer::MailerError;

/// Errors raised by the Elastic Email transport itself. Rejections by the
/// API are not errors; they come back inside the delivery.
#[derive(Debug, Error)]
pub enum ElasticEmailError {
    /// No API key is configured
    #[error("Api Key for Elastic Email could not be found.")]
    MissingApiKey,

    /// The HTTP request failed
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl From<ElasticEmailError> for MailerError {
    fn from(err: ElasticEmailError) -> Self {
        debug!("ElasticEmailError -> MailerError");

        match err {
            ElasticEmailError::MissingApiKey => {
                MailerError::Configuration(ElasticEmailError::MissingApiKey.to_string())
            }
            ElasticEmailError::Transport(e) => MailerError::SendError(e.into()),
        }
    }
}
