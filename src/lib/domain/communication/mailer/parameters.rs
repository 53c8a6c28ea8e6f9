//! Flat request parameters sent to an email provider

use std::fmt;

use serde::{ser::SerializeMap, Serialize, Serializer};

/// A scalar parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// A string
    Text(String),

    /// A boolean, encoded as `true` / `false`
    Bool(bool),

    /// An integer
    Integer(i64),

    /// A floating point number
    Float(f64),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Float(number) => write!(f, "{number}"),
        }
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// An ordered set of request parameters. Keys are unique; inserting an
/// existing key replaces its value in place.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Parameters(Vec<(String, ParameterValue)>);

impl Parameters {
    /// An empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParameterValue>) {
        let key = key.into();
        let value = value.into();

        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Copies every parameter of `other` into this set
    pub fn extend(&mut self, other: &Parameters) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// Looks up a parameter
    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Whether a parameter is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// The parameters as form fields
    pub fn to_form(&self) -> Vec<(&str, String)> {
        self.iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect()
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}
