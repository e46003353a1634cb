use hybrid_context::communication::{
    decode_message, encode_message, Channel, CommunicationError, Loopback, Message, Unconnected,
};
use hybrid_context::reporting::{Classify, ErrorKind};
use serde_json::json;

fn message(value: serde_json::Value) -> Message {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn decode_rejects_non_json_and_non_objects() {
    assert!(matches!(decode_message("hello"), Err(CommunicationError::Decode(_))));
    assert!(matches!(decode_message("[1, 2]"), Err(CommunicationError::NotAnObject)));

    let decoded = decode_message(r#"{"query": "weather"}"#).unwrap();
    assert_eq!(decoded["query"], json!("weather"));
}

#[test]
fn encode_produces_compact_json() {
    let encoded = encode_message(&message(json!({"agent": "A", "n": 1}))).unwrap();
    assert_eq!(encoded, r#"{"agent":"A","n":1}"#);
}

#[test]
fn loopback_exchange_returns_the_sent_message() {
    let channel = Channel::new(Loopback::new());
    let outgoing = message(json!({"query": "weather today"}));

    let reply = channel.exchange(&outgoing).unwrap();

    assert_eq!(reply, outgoing);
    assert_eq!(channel.transport().pending(), 0);
    assert!(matches!(channel.receive_json(), Err(CommunicationError::Closed)));
}

#[test]
fn unconnected_errors_propagate_to_the_caller() {
    let channel = Channel::new(Unconnected);
    let outgoing = message(json!({"query": "weather"}));

    // Sending is accepted and dropped; receiving is where the failure surfaces.
    channel.send_json(&outgoing).unwrap();
    let err = channel.exchange(&outgoing).unwrap_err();

    assert!(matches!(err, CommunicationError::NotConnected));
    assert_eq!(err.kind(), ErrorKind::CommunicationError);
}
