//! Party membership: creation, invitations, leader election, rosters, and
//! presence broadcast.
//!
//! The [`PartyCoordinator`] owns the party table and the player → party
//! association; players never hold references into a party, only the
//! coordinator's [`PartyId`] key, so dissolving a party cannot leave dangling
//! state behind. Precondition failures are network-silent: the operation
//! returns a [`PartyError`] for callers and tests, logs, and changes nothing.

pub mod coordinator;
pub mod party;
pub mod presence;

pub use coordinator::PartyCoordinator;
pub use party::{Party, PartyError};
pub use presence::{announce_player, broadcast_except, broadcast_presence};

use tether_protocol::{PlayerId, ServerMessage, Tick};

/// Ticks an invitation stays valid after it is issued.
pub const INVITE_EXPIRY_TICKS: Tick = 60_000;

/// Minimum ticks between two invitation-expiry sweeps.
pub const INVITE_SWEEP_INTERVAL_TICKS: Tick = 10_000;

// ---------------------------------------------------------------------------
// Collaborator contracts
// ---------------------------------------------------------------------------

/// A connected player's identity, as known to the player directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    /// The player's id.
    pub player_id: PlayerId,
    /// The player's display name.
    pub name: String,
    /// The player's level.
    pub level: u16,
}

/// Lookup of connected players. Implemented by the server's player
/// directory; stubbed in tests.
pub trait Roster {
    /// Resolves a connected player. `None` for unknown or disconnected ids.
    fn profile(&self, id: PlayerId) -> Option<PlayerProfile>;

    /// All connected player ids, in ascending id order.
    fn connected(&self) -> Vec<PlayerId>;

    /// Whether `id` names a connected player.
    fn contains(&self, id: PlayerId) -> bool {
        self.profile(id).is_some()
    }
}

/// Delivery of one typed message to one player. Implemented over the
/// transport boundary's outbound queue.
pub trait Outbound {
    /// Queues `msg` for delivery to `to`. Must not block.
    fn send(&self, to: PlayerId, msg: ServerMessage);
}
