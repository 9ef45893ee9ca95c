//! Request and response envelopes for the view service protocol.
//!
//! Follows JSON-RPC 2.0 conventions. Extension handlers themselves only see
//! [`ServiceParams`], an ordered list of string key/value pairs.

use serde::{Deserialize, Serialize};

/// A service request from an inspection tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugRequest {
    pub method: String,
    pub params: Option<serde_json::Value>,
    pub id: u64,
}

/// A response sent back to the tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugResponse {
    pub result: Option<serde_json::Value>,
    pub error: Option<DebugError>,
    pub id: u64,
}

/// An error included in a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl DebugResponse {
    /// Create a successful response with a JSON result.
    pub fn ok(id: u64, result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn err(id: u64, error: DebugError) -> Self {
        Self {
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// Request parameters as ordered key/value string pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceParams {
    pairs: Vec<(String, String)>,
}

impl ServiceParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Flatten a JSON params object into string pairs.
    ///
    /// Strings are taken verbatim, other scalars use their JSON text, nulls
    /// are dropped. Anything other than an object yields no params.
    pub fn from_json(params: Option<&serde_json::Value>) -> Self {
        let Some(serde_json::Value::Object(map)) = params else {
            return Self::default();
        };
        let pairs = map
            .iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((key.clone(), s.clone())),
                other => Some((key.clone(), other.to_string())),
            })
            .collect();
        Self { pairs }
    }

    /// The value of the first pair whose key is `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
