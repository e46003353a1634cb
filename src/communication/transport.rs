use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

use super::codec::{decode_message, encode_message, CommunicationError, Message};

/// Moves encoded messages between components.
pub trait Transport {
    fn send(&self, encoded: String) -> Result<(), CommunicationError>;

    fn receive(&self) -> Result<String, CommunicationError>;
}

/// Placeholder transport: sends are encoded and dropped, receives fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconnected;

impl Transport for Unconnected {
    fn send(&self, encoded: String) -> Result<(), CommunicationError> {
        debug!(bytes = encoded.len(), "dropping message on unconnected transport");
        Ok(())
    }

    fn receive(&self) -> Result<String, CommunicationError> {
        Err(CommunicationError::NotConnected)
    }
}

/// In-memory FIFO: every sent message is received back in order.
#[derive(Debug, Default)]
pub struct Loopback {
    queue: Mutex<VecDeque<String>>,
}

impl Loopback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Transport for Loopback {
    fn send(&self, encoded: String) -> Result<(), CommunicationError> {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(encoded);
        Ok(())
    }

    fn receive(&self) -> Result<String, CommunicationError> {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or(CommunicationError::Closed)
    }
}

/// JSON messaging over a [`Transport`].
#[derive(Debug, Default)]
pub struct Channel<T> {
    transport: T,
}

impl<T: Transport> Channel<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn send_json(&self, message: &Message) -> Result<(), CommunicationError> {
        let encoded = encode_message(message)?;
        self.transport.send(encoded)
    }

    pub fn receive_json(&self) -> Result<Message, CommunicationError> {
        let raw = self.transport.receive()?;
        decode_message(&raw)
    }

    /// Send `message` and wait for the reply.
    pub fn exchange(&self, message: &Message) -> Result<Message, CommunicationError> {
        self.send_json(message)?;
        self.receive_json()
    }
}
