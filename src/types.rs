use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use sonic_rs::{JsonValueTrait, Value};

/// Prefix of every successful push message.
pub const SUCCESS_PREFIX: &str = "ox-db : ";

/// Record submitted to `/push`. Passed through to the service without local validation;
/// unset optional fields are left out of the JSON body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl PushRequest {
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            embeddings: None,
            description: None,
            metadata: None,
            key: None,
        }
    }

    pub fn with_embeddings(mut self, embeddings: bool) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds one metadata entry, creating the map on first use.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Successful push: the decoded response body and the prefixed message built from it.
#[derive(Clone, Debug, PartialEq)]
pub struct PushReceipt {
    response: Value,
    message: String,
}

impl PushReceipt {
    pub fn new(response: Value) -> Self {
        let message = format!("{SUCCESS_PREFIX}{}", display_json(&response));
        Self { response, message }
    }

    pub fn response(&self) -> &Value {
        &self.response
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_response(self) -> Value {
        self.response
    }
}

impl fmt::Display for PushReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Strings render bare, everything else as compact JSON.
pub(crate) fn display_json(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_owned(),
        // A `Value` always serializes: object keys are strings and numbers are finite.
        None => sonic_rs::to_string(value).unwrap_or_default(),
    }
}
