//! Result decoding
//!
//! Picks JSON or text based on the response content type. Nothing here
//! classifies success; that is the executor's job.

use crate::http::HttpResponse;
use serde_json::Value;

/// Content type prefix that selects JSON decoding
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// Parsed JSON of any shape
    Json(Value),
    /// Raw text for every other content type
    Text(String),
}

/// Decode a response body
///
/// JSON is used when the content type begins with `application/json`
/// (case-sensitive), text otherwise. A malformed JSON body is returned as
/// the parse error, unwrapped.
pub fn decode(response: &HttpResponse) -> serde_json::Result<DecodedBody> {
    match response.content_type() {
        Some(content_type) if content_type.starts_with(JSON_CONTENT_TYPE) => {
            Ok(DecodedBody::Json(response.json()?))
        }
        _ => Ok(DecodedBody::Text(response.text())),
    }
}
