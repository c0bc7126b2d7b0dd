//! Raw survey answers
//!
//! Answers arrive loosely typed: an HTML form posts everything as text while
//! a JSON client may send numbers directly. [`RawAnswers`] keeps both shapes
//! and leaves interpretation to the encoder.

use crate::error::EncodeError;
use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// A single answer value as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
}

impl AnswerValue {
    /// Interpret the answer as a number.
    ///
    /// Text is trimmed before parsing. Returns `None` for unparsable text;
    /// finiteness is left to the caller.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            AnswerValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Interpret the answer as a category label
    pub fn as_label(&self) -> Cow<'_, str> {
        match self {
            AnswerValue::Text(s) => Cow::Borrowed(s.as_str()),
            AnswerValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        AnswerValue::Number(n)
    }
}

impl From<i32> for AnswerValue {
    fn from(n: i32) -> Self {
        AnswerValue::Number(f64::from(n))
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

impl AnswerValue {
    /// Accept JSON numbers and strings; anything else is reported against `field`
    fn from_json_value(field: &str, value: Value) -> Result<Self, EncodeError> {
        match value {
            Value::String(s) => Ok(AnswerValue::Text(s)),
            Value::Number(n) => n.as_f64().map(AnswerValue::Number).ok_or_else(|| {
                EncodeError::UnsupportedValue {
                    field: field.to_string(),
                    value: n.to_string(),
                }
            }),
            other => Err(EncodeError::UnsupportedValue {
                field: field.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Mapping of answer name to raw value for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawAnswers {
    values: AHashMap<String, AnswerValue>,
}

impl RawAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AnswerValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AnswerValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AnswerValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.values.iter()
    }

    /// Parse a flat JSON object such as `{"gender": "Male", "tenure": 12}`
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let raw: AHashMap<String, Value> = serde_json::from_str(json)?;
        Ok(Self::from_json_map(raw)?)
    }

    fn from_json_map(raw: AHashMap<String, Value>) -> Result<Self, EncodeError> {
        raw.into_iter()
            .map(|(field, value)| {
                let answer = AnswerValue::from_json_value(&field, value)?;
                Ok::<_, EncodeError>((field, answer))
            })
            .collect()
    }

    /// Parse `name=value` pairs, as submitted by a form or the command line.
    ///
    /// Values are kept as text; only the first `=` splits name from value.
    pub fn from_pairs<I, S>(pairs: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut answers = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                crate::Error::InvalidConfig(format!("expected name=value, got {:?}", pair))
            })?;
            answers.insert(name.trim(), value);
        }
        Ok(answers)
    }
}

impl<'de> Deserialize<'de> for RawAnswers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = AHashMap::<String, Value>::deserialize(deserializer)?;
        Self::from_json_map(raw).map_err(serde::de::Error::custom)
    }
}

impl<K, V> FromIterator<(K, V)> for RawAnswers
where
    K: Into<String>,
    V: Into<AnswerValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut answers = Self::new();
        for (k, v) in iter {
            answers.insert(k, v);
        }
        answers
    }
}
