//! Outbound side of the cross-context channel.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// No sub-context is attached.
    Detached,
    /// The sub-context went away while posting.
    Disconnected,
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detached => write!(f, "budget sub-context is not attached"),
            Self::Disconnected => write!(f, "budget sub-context disconnected"),
        }
    }
}

impl Error for ChannelError {}

/// Fire-and-forget delivery into the sub-context.
pub trait SubContextPort {
    fn is_attached(&self) -> bool;
    fn post(&self, message: Value) -> Result<(), ChannelError>;
}

/// Port backed by an unbounded tokio channel; the receiving half plays the
/// sub-context.
#[derive(Debug, Clone)]
pub struct ChannelPort {
    tx: mpsc::UnboundedSender<Value>,
}

impl ChannelPort {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SubContextPort for ChannelPort {
    fn is_attached(&self) -> bool {
        !self.tx.is_closed()
    }

    fn post(&self, message: Value) -> Result<(), ChannelError> {
        self.tx.send(message).map_err(|_| ChannelError::Disconnected)
    }
}
