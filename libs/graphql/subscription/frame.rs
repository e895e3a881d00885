//! graphql-ws frames
//!
//! Every frame is a JSON object tagged by its `type` field.

use crate::types::Variables;
use hypersockets::Headers;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Frames sent by the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    ConnectionInit { payload: Value },
    Start { id: String, payload: StartPayload },
    /// `id` is `null` when the subscription is cancelled before the ack
    Stop { id: Option<String> },
    ConnectionTerminate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartPayload {
    pub query: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Headers>,
}

impl ClientFrame {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Frames received from the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    ConnectionAck {
        #[serde(default, deserialize_with = "frame_id")]
        id: Option<String>,
    },
    Data {
        #[serde(default)]
        payload: Value,
    },
    Error {
        #[serde(default)]
        payload: Value,
    },
    ConnectionError {
        #[serde(default)]
        error: Value,
        #[serde(default)]
        payload: Value,
    },
    #[serde(rename = "ka")]
    KeepAlive,
    Stop {
        #[serde(default, deserialize_with = "frame_id")]
        id: Option<String>,
    },
    ConnectionTerminate {
        #[serde(default, deserialize_with = "frame_id")]
        id: Option<String>,
    },
    Complete {
        #[serde(default, deserialize_with = "frame_id")]
        id: Option<String>,
    },
}

impl ServerFrame {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Wire name of the frame type
    pub fn kind(&self) -> &'static str {
        match self {
            ServerFrame::ConnectionAck { .. } => "connection_ack",
            ServerFrame::Data { .. } => "data",
            ServerFrame::Error { .. } => "error",
            ServerFrame::ConnectionError { .. } => "connection_error",
            ServerFrame::KeepAlive => "ka",
            ServerFrame::Stop { .. } => "stop",
            ServerFrame::ConnectionTerminate { .. } => "connection_terminate",
            ServerFrame::Complete { .. } => "complete",
        }
    }
}

/// Frame ids are strings on the wire, but numeric ids are accepted too
fn frame_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_value(frame: &ClientFrame) -> Value {
        serde_json::from_str(&frame.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_client_frames() {
        assert_eq!(
            to_value(&ClientFrame::ConnectionInit { payload: json!({ "headers": {} }) }),
            json!({ "type": "connection_init", "payload": { "headers": {} } })
        );
        assert_eq!(
            to_value(&ClientFrame::Stop { id: None }),
            json!({ "type": "stop", "id": null })
        );
        assert_eq!(
            to_value(&ClientFrame::ConnectionTerminate),
            json!({ "type": "connection_terminate" })
        );
    }

    #[test]
    fn test_start_frame() {
        let mut context = Headers::new();
        context.insert("Authorization", "Bearer t");

        let frame = ClientFrame::Start {
            id: "abc".into(),
            payload: StartPayload {
                query: "subscription { tick }".into(),
                variables: None,
                context: Some(context),
            },
        };
        assert_eq!(
            to_value(&frame),
            json!({
                "type": "start",
                "id": "abc",
                "payload": {
                    "query": "subscription { tick }",
                    "context": { "Authorization": "Bearer t" }
                }
            })
        );
    }

    #[test]
    fn test_parse_server_frames() {
        assert_eq!(
            ServerFrame::parse(r#"{"type":"connection_ack","id":"abc"}"#).unwrap(),
            ServerFrame::ConnectionAck { id: Some("abc".into()) }
        );
        assert_eq!(
            ServerFrame::parse(r#"{"type":"connection_ack","id":7}"#).unwrap(),
            ServerFrame::ConnectionAck { id: Some("7".into()) }
        );
        assert_eq!(
            ServerFrame::parse(r#"{"type":"connection_ack"}"#).unwrap(),
            ServerFrame::ConnectionAck { id: None }
        );
        assert_eq!(
            ServerFrame::parse(r#"{"type":"data","id":"abc","payload":{"data":{"n":1}}}"#).unwrap(),
            ServerFrame::Data { payload: json!({ "data": { "n": 1 } }) }
        );
        assert_eq!(ServerFrame::parse(r#"{"type":"ka"}"#).unwrap(), ServerFrame::KeepAlive);
        assert_eq!(
            ServerFrame::parse(r#"{"type":"complete","id":"abc"}"#).unwrap().kind(),
            "complete"
        );
    }

    #[test]
    fn test_parse_connection_error() {
        let frame = ServerFrame::parse(r#"{"type":"connection_error","error":{"message":"denied"}}"#).unwrap();
        assert_eq!(
            frame,
            ServerFrame::ConnectionError {
                error: json!({ "message": "denied" }),
                payload: Value::Null
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        assert!(ServerFrame::parse(r#"{"type":"next","payload":{}}"#).is_err());
        assert!(ServerFrame::parse(r#"{"payload":{}}"#).is_err());
        assert!(ServerFrame::parse("not json").is_err());
    }
}
