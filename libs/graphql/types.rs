//! Request and response envelopes

use hypersockets::Headers;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GraphQL variables: a JSON object, keys unique, order irrelevant
pub type Variables = Map<String, Value>;

/// Convert a JSON value into variables
///
/// Returns `None` for anything that is not an object, including `null`.
///
/// ```
/// use graphql::types::variables;
/// use serde_json::json;
///
/// let vars = variables(json!({ "id": 1 })).unwrap();
/// assert_eq!(vars["id"], 1);
/// assert!(variables(json!(null)).is_none());
/// ```
pub fn variables(value: Value) -> Option<Variables> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Operation envelope
///
/// Built once per call and never mutated afterwards. Serializes to the
/// HTTP request body; `variables` is omitted entirely when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    pub query: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,

    /// Header snapshot sent as the subscription `context`
    #[serde(skip)]
    pub context: Option<Headers>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>, variables: Option<Variables>) -> Self {
        Self {
            query: query.into(),
            variables,
            context: None,
        }
    }

    /// Attach a header snapshot
    pub fn with_context(mut self, headers: Headers) -> Self {
        self.context = Some(headers);
        self
    }

    /// Serialize the `{query, variables?}` request body
    pub fn to_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Result envelope returned by `raw_request`
///
/// Only produced for successful requests, so `data` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    pub data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,

    pub headers: Headers,

    pub status: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
}

impl GraphQLResponse {
    /// Deserialize `data` into a typed value
    pub fn data_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.data)
    }
}
