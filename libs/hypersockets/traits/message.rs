/// A single message exchanged over a persistent connection
/// Can be Text or Binary data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(_) => None,
        }
    }

    /// Get the message as binary, if it is binary
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            WsMessage::Text(_) => None,
            WsMessage::Binary(b) => Some(b),
        }
    }

    /// Check if message is text
    pub fn is_text(&self) -> bool {
        matches!(self, WsMessage::Text(_))
    }

    /// Check if message is binary
    pub fn is_binary(&self) -> bool {
        matches!(self, WsMessage::Binary(_))
    }

    /// Interpret the payload as UTF-8 text
    ///
    /// Binary messages are accepted when they hold valid UTF-8, which lets
    /// JSON protocols tolerate servers that frame text as binary.
    pub fn to_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(b) => std::str::from_utf8(b).ok(),
        }
    }
}

impl From<String> for WsMessage {
    fn from(text: String) -> Self {
        WsMessage::Text(text)
    }
}

impl From<&str> for WsMessage {
    fn from(text: &str) -> Self {
        WsMessage::Text(text.to_string())
    }
}

impl From<Vec<u8>> for WsMessage {
    fn from(data: Vec<u8>) -> Self {
        WsMessage::Binary(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_accessors() {
        let msg = WsMessage::from("hello");
        assert!(msg.is_text());
        assert_eq!(msg.as_text(), Some("hello"));
        assert_eq!(msg.as_binary(), None);
    }

    #[test]
    fn test_binary_utf8_as_text() {
        let msg = WsMessage::from(b"{\"type\":\"ka\"}".to_vec());
        assert!(msg.is_binary());
        assert_eq!(msg.as_text(), None);
        assert_eq!(msg.to_text(), Some("{\"type\":\"ka\"}"));

        let invalid = WsMessage::Binary(vec![0xff, 0xfe]);
        assert_eq!(invalid.to_text(), None);
    }
}
