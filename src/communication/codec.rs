use serde_json::{Map, Value};
use thiserror::Error;

use crate::reporting::{Classify, ErrorKind};

/// A JSON object exchanged between components.
pub type Message = Map<String, Value>;

#[derive(Debug, Error)]
pub enum CommunicationError {
    #[error("Error encoding message to JSON: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Error decoding message from JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Decoded message is not a JSON object")]
    NotAnObject,
    #[error("No transport is connected")]
    NotConnected,
    #[error("Transport closed with no message pending")]
    Closed,
}

impl Classify for CommunicationError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::CommunicationError
    }
}

pub fn encode_message(message: &Message) -> Result<String, CommunicationError> {
    serde_json::to_string(message).map_err(CommunicationError::Encode)
}

pub fn decode_message(raw: &str) -> Result<Message, CommunicationError> {
    match serde_json::from_str::<Value>(raw).map_err(CommunicationError::Decode)? {
        Value::Object(map) => Ok(map),
        _ => Err(CommunicationError::NotAnObject),
    }
}
