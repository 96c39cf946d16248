//! Session and request events published into the bus.
//!
//! Engine-side activation events live in `tether-world`; the types here are
//! produced at the session and transport boundaries.

use tether_protocol::{PlayerId, Tick};

/// A player finished connecting and entered the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerJoined {
    /// The new player.
    pub player_id: PlayerId,
    /// World space the player spawned into.
    pub world_space_id: u32,
    /// Cell the player spawned into.
    pub cell_id: u32,
}

/// A player disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLeft {
    /// The departing player.
    pub player_id: PlayerId,
}

/// One server tick elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    /// The tick that just started.
    pub current_tick: Tick,
}

/// A decoded client request, tagged with its sender. Each request payload
/// type gets its own event kind on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<T> {
    /// The player the transport decoded this request from.
    pub sender: PlayerId,
    /// The decoded request payload.
    pub payload: T,
}
