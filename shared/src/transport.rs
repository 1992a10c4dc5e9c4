use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

use thiserror::Error;

use crate::input::InputDescriptor;
use crate::trace::TraceEntry;
use crate::types::PlayerId;

/// Messages flowing client → server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// An input descriptor destined for the per-step input queues.
    Move(InputDescriptor),
    /// A batch of diagnostic trace records.
    Trace(Vec<TraceEntry>),
    /// Round-trip probe; the server echoes the id back unchanged.
    RttQuery { id: u32 },
}

/// Messages flowing server → client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    PlayerJoined {
        player_id: PlayerId,
        join_time_ms: f64,
        disconnect_time_ms: f64,
    },
    /// Binary sync payload, framed by the network transmitter.
    WorldUpdate { payload: Vec<u8> },
    RoomUpdate {
        player_id: PlayerId,
        from: String,
        to: String,
    },
    RttResponse { id: u32 },
}

/// The peer's receive end is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to send message: the receiving end of the pipe is closed")]
pub struct SendError;

/// The peer's send end is gone; no further messages will ever arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to receive message: the sending end of the pipe is closed")]
pub struct RecvError;

/// Ordered, reliable outbound half of a message pipe.
pub trait MessageSender<M> {
    fn send(&self, message: M) -> Result<(), SendError>;
}

/// Ordered, reliable inbound half of a message pipe. `receive` never blocks;
/// `Ok(None)` means no message is waiting.
pub trait MessageReceiver<M> {
    fn receive(&mut self) -> Result<Option<M>, RecvError>;
}

/// In-process message pipe. Preserves per-pipe FIFO order, which is the
/// ordering contract real transports must also meet.
pub struct MessageChannel;

impl MessageChannel {
    pub fn unbounded<M: 'static>() -> (Box<dyn MessageSender<M>>, Box<dyn MessageReceiver<M>>) {
        let (sender, receiver) = channel();
        (Box::new(sender), Box::new(ChannelReceiver { receiver }))
    }
}

impl<M> MessageSender<M> for Sender<M> {
    fn send(&self, message: M) -> Result<(), SendError> {
        Sender::send(self, message).map_err(|_| SendError)
    }
}

struct ChannelReceiver<M> {
    receiver: Receiver<M>,
}

impl<M> MessageReceiver<M> for ChannelReceiver<M> {
    fn receive(&mut self) -> Result<Option<M>, RecvError> {
        match self.receiver.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RecvError),
        }
    }
}
