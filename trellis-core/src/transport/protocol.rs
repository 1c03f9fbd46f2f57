//! Duplex channel messages.
//!
//! ```text
//! client -> host   {"type": "event", "handler": "<id>", "value": <any|null>}
//! host -> client   {"type": "reload", "tree": <Node>}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::Descriptor;

/// A client message that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed client message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("client message binds an empty handler id")]
    EmptyHandler,
}

/// Client to host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Event {
        handler: String,
        #[serde(default)]
        value: Option<Value>,
        /// DOM event name, sent by the browser runtime for diagnostics.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<String>,
    },
}

impl ClientMessage {
    pub fn event(handler: impl Into<String>, value: Option<Value>) -> Self {
        ClientMessage::Event {
            handler: handler.into(),
            value,
            event: None,
        }
    }

    /// Decode one text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let message: ClientMessage = serde_json::from_str(text)?;
        match &message {
            ClientMessage::Event { handler, .. } if handler.is_empty() => Err(ProtocolError::EmptyHandler),
            _ => Ok(message),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Host to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Reload { tree: Descriptor },
}

impl ServerMessage {
    pub fn reload(tree: Descriptor) -> Self {
        ServerMessage::Reload { tree }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ElementDescriptor;
    use serde_json::json;

    #[test]
    fn parses_browser_events() {
        let message =
            ClientMessage::parse(r#"{"type":"event","event":"change","handler":"on_change_2_0","value":"hi"}"#)
                .unwrap();
        assert_eq!(
            message,
            ClientMessage::Event {
                handler: "on_change_2_0".into(),
                value: Some(json!("hi")),
                event: Some("change".into()),
            }
        );
    }

    #[test]
    fn value_is_optional() {
        let ClientMessage::Event { value, .. } =
            ClientMessage::parse(r#"{"type":"event","handler":"on_click_1_0"}"#).unwrap();
        assert_eq!(value, None);

        let ClientMessage::Event { value, .. } =
            ClientMessage::parse(r#"{"type":"event","handler":"on_click_1_0","value":null}"#).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn rejects_malformed_messages() {
        assert!(matches!(ClientMessage::parse("not json"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(
            ClientMessage::parse(r#"{"type":"event"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::parse(r#"{"type":"ping","handler":"x"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::parse(r#"{"type":"event","handler":""}"#),
            Err(ProtocolError::EmptyHandler)
        ));
    }

    #[test]
    fn reload_wire_shape() {
        let tree: Descriptor = ElementDescriptor::new("Spacer").into();
        let json: Value = serde_json::from_str(&ServerMessage::reload(tree.clone()).to_json().unwrap()).unwrap();
        assert_eq!(json, json!({"type": "reload", "tree": {"type": "Spacer", "props": {}, "children": []}}));
        assert_eq!(
            ServerMessage::parse(&json.to_string()).unwrap(),
            ServerMessage::Reload { tree }
        );
    }
}
