//! Server composition root: player directory, event wiring, and the
//! outbound message queue.
//!
//! [`SyncServer`] owns the event bus and every stateful component, and wires
//! each inbound event kind to the component that handles it. The engine and
//! transport boundaries feed it by publishing events and calling
//! [`SyncServer::connect_player`] / [`SyncServer::disconnect_player`]; it
//! answers through the outbound channel.

pub mod events;
pub mod outbound;
pub mod players;
pub mod server;

pub use events::{PlayerJoined, PlayerLeft, Request, TickEvent};
pub use outbound::{ChannelOutbound, OutboundMessage, outbound_channel};
pub use players::{JoinError, Player, PlayerDirectory};
pub use server::SyncServer;
