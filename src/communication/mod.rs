//! JSON message codec and the transport seam between components.
//!
//! No network transport exists yet. [`Unconnected`] stands in for it and
//! [`Loopback`] is an in-memory queue. Errors from this module are returned
//! to the caller; nothing here reports or swallows them.

pub mod codec;
pub mod transport;

pub use codec::{decode_message, encode_message, CommunicationError, Message};
pub use transport::{Channel, Loopback, Transport, Unconnected};
