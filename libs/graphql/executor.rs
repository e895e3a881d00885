//! Request executor
//!
//! One POST per call, no retry. The body is `{query, variables?}`, the
//! response is decoded by [`decode`] and then classified:
//!
//! - 2xx status
//! - no `errors` field (or `errors: null`)
//! - a non-empty `data` field (`null`, `false`, `0` and `""` count as empty)
//!
//! Anything else becomes a [`ClientError`].

use crate::decoder::{decode, DecodedBody, JSON_CONTENT_TYPE};
use crate::error::{ClientError, ClientErrorResponse, RequestContext, Result};
use crate::http::{HttpResponse, HttpTransport};
use crate::types::{GraphQLRequest, GraphQLResponse};
use hypersockets::Headers;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Executes operations against one endpoint
pub struct RequestExecutor<'a> {
    transport: &'a dyn HttpTransport,
    endpoint: &'a str,
    headers: &'a Headers,
}

impl<'a> RequestExecutor<'a> {
    pub fn new(transport: &'a dyn HttpTransport, endpoint: &'a str, headers: &'a Headers) -> Self {
        Self {
            transport,
            endpoint,
            headers,
        }
    }

    /// Headers for the POST: `Content-Type` first, defaults layered on top
    pub fn request_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type", JSON_CONTENT_TYPE);
        headers.extend_from(self.headers);
        headers
    }

    /// Execute and return the full result envelope
    ///
    /// A failure carries the response headers.
    pub async fn raw_request(&self, request: &GraphQLRequest) -> Result<GraphQLResponse> {
        self.execute(request, true).await
    }

    /// Execute and return only `data`
    ///
    /// A failure carries the status but not the headers.
    pub async fn request<T: DeserializeOwned>(&self, request: &GraphQLRequest) -> Result<T> {
        let response = self.execute(request, false).await?;
        Ok(serde_json::from_value(response.data)?)
    }

    async fn execute(&self, request: &GraphQLRequest, with_headers: bool) -> Result<GraphQLResponse> {
        let body = request.to_body()?;

        debug!(endpoint = %self.endpoint, "Executing GraphQL request");
        let response = self
            .transport
            .post(self.endpoint, &self.request_headers(), body)
            .await?;
        let decoded = decode(&response)?;

        match classify(&response, decoded) {
            Ok(mut payload) => {
                debug!(status = response.status, "GraphQL request succeeded");
                Ok(GraphQLResponse {
                    data: payload.remove("data").unwrap_or(Value::Null),
                    extensions: payload.remove("extensions"),
                    errors: None,
                    headers: response.headers,
                    status: response.status,
                })
            }
            Err(body) => {
                warn!(status = response.status, "GraphQL request failed");
                Err(ClientError {
                    response: ClientErrorResponse {
                        body,
                        status: response.status,
                        headers: with_headers.then_some(response.headers),
                    },
                    request: RequestContext {
                        query: request.query.clone(),
                        variables: request.variables.clone(),
                    },
                }
                .into())
            }
        }
    }
}

/// Split a decoded body into a success payload or a failure body
fn classify(response: &HttpResponse, decoded: DecodedBody) -> std::result::Result<Map<String, Value>, Map<String, Value>> {
    match decoded {
        DecodedBody::Json(Value::Object(payload)) => {
            let has_errors = payload.get("errors").map_or(false, |e| !e.is_null());
            let has_data = payload.get("data").map_or(false, is_truthy);

            if response.is_success() && !has_errors && has_data {
                Ok(payload)
            } else {
                Err(payload)
            }
        }
        DecodedBody::Json(other) => Err(wrap_error(other)),
        DecodedBody::Text(text) => Err(wrap_error(Value::String(text))),
    }
}

fn wrap_error(value: Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("error".into(), value);
    body
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
