//! The outbound message queue toward the transport boundary.

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::warn;

use tether_party::Outbound;
use tether_protocol::{PlayerId, ServerMessage};

/// One queued delivery: which player, which message.
pub type OutboundMessage = (PlayerId, ServerMessage);

/// [`Outbound`] implementation over a crossbeam channel. The transport side
/// owns the receiver and frames/sends each message on its connection.
#[derive(Clone)]
pub struct ChannelOutbound {
    sender: Sender<OutboundMessage>,
}

/// Creates the outbound queue: the core keeps the [`ChannelOutbound`], the
/// transport drains the [`Receiver`].
pub fn outbound_channel() -> (ChannelOutbound, Receiver<OutboundMessage>) {
    let (sender, receiver) = unbounded();
    (ChannelOutbound { sender }, receiver)
}

impl Outbound for ChannelOutbound {
    fn send(&self, to: PlayerId, msg: ServerMessage) {
        // A gone transport only costs us the message; the core never fails.
        if self.sender.send((to, msg)).is_err() {
            warn!("outbound queue is closed, dropping message for player {to}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tether_protocol::PartyLeft;

    #[test]
    fn test_messages_arrive_in_send_order() {
        let (out, rx) = outbound_channel();

        out.send(1, ServerMessage::PartyLeft(PartyLeft {}));
        out.send(2, ServerMessage::PartyLeft(PartyLeft {}));

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].0, 1);
        assert_eq!(received[1].0, 2);
    }

    #[test]
    fn test_send_after_receiver_dropped_does_not_panic() {
        let (out, rx) = outbound_channel();
        drop(rx);
        out.send(1, ServerMessage::PartyLeft(PartyLeft {}));
    }
}
