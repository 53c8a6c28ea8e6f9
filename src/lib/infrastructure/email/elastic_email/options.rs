//! Per-send options for the Elastic Email transport

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::domain::communication::mailer::{ParameterValue, Parameters};

/// The furthest in the future a send can be scheduled: one year, in minutes.
pub const MAX_SCHEDULE_MINUTES: u32 = 524_160;

lazy_static! {
    static ref NUMERIC_REGEX: Regex =
        Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").unwrap();
}

/// Whether `value` reads as a number: an optionally signed integer or
/// decimal, with an optional exponent and surrounding whitespace.
pub fn is_numeric(value: &str) -> bool {
    NUMERIC_REGEX.is_match(value)
}

/// Options applied on top of a message when it is sent.
///
/// ```
/// use elastic_email_transport::infrastructure::email::elastic_email::SendOptions;
///
/// let options = SendOptions::builder()
///     .transactional(true)
///     .template(1234)
///     .merge_variable("firstname", "Foo")
///     .build();
///
/// assert!(options.parameters().contains_key("merge_firstname"));
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SendOptions {
    transactional: Option<bool>,
    template: Option<String>,
    schedule_minutes: Option<String>,
    merge_variables: Vec<(String, ParameterValue)>,
}

impl SendOptions {
    /// Start building options
    pub fn builder() -> SendOptionsBuilder {
        SendOptionsBuilder::default()
    }

    /// The request parameters these options contribute
    pub fn parameters(&self) -> Parameters {
        let mut params = Parameters::new();

        if let Some(transactional) = self.transactional {
            params.insert("isTransactional", transactional);
        }

        if let Some(template) = &self.template {
            params.insert("template", template.as_str());
        }

        if let Some(minutes) = &self.schedule_minutes {
            params.insert("timeOffSetMinutes", minutes.as_str());
        }

        for (field, value) in &self.merge_variables {
            params.insert(format!("merge_{field}"), value.clone());
        }

        params
    }
}

/// Builder for [`SendOptions`]
#[derive(Debug, Default, Clone)]
pub struct SendOptionsBuilder {
    options: SendOptions,
}

impl SendOptionsBuilder {
    /// Marks the email as transactional (or explicitly not)
    pub fn transactional(mut self, transactional: bool) -> Self {
        self.options.transactional = Some(transactional);
        self
    }

    /// Adds template merge variables. An empty mapping changes nothing.
    pub fn merge_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParameterValue>,
    {
        for (field, value) in variables {
            self = self.merge_variable(field, value);
        }

        self
    }

    /// Adds a single template merge variable
    pub fn merge_variable(mut self, field: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        let field = field.into();
        let value = value.into();

        match self
            .options
            .merge_variables
            .iter_mut()
            .find(|(existing, _)| *existing == field)
        {
            Some(entry) => entry.1 = value,
            None => self.options.merge_variables.push((field, value)),
        }

        self
    }

    /// Uses a template created in the Elastic Email dashboard. Ignored unless numeric.
    pub fn template(mut self, id: impl ToString) -> Self {
        let id = id.to_string();

        if is_numeric(&id) {
            self.options.template = Some(id);
        } else {
            debug!(template = %id, "ignoring non-numeric template id");
        }

        self
    }

    /// Delays the send by `minutes` after the request. Ignored unless numeric.
    pub fn schedule_time(mut self, minutes: impl ToString) -> Self {
        let minutes = minutes.to_string();

        if !is_numeric(&minutes) {
            debug!(minutes = %minutes, "ignoring non-numeric schedule time");
            return self;
        }

        let in_range = minutes
            .trim()
            .parse::<f64>()
            .map(|value| (0.0..=f64::from(MAX_SCHEDULE_MINUTES)).contains(&value))
            .unwrap_or(false);

        if !in_range {
            debug!(
                minutes = %minutes,
                max = MAX_SCHEDULE_MINUTES,
                "passing through schedule time outside the range Elastic Email accepts"
            );
        }

        self.options.schedule_minutes = Some(minutes);
        self
    }

    /// Freezes the options
    pub fn build(self) -> SendOptions {
        self.options
    }
}
