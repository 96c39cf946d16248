//! Stable wire opcodes.
//!
//! Opcodes are append-only: a shipped ordinal is never renumbered or reused,
//! so old clients keep decoding the messages they know about. The
//! `const_assert_eq!` block pins every shipped ordinal at compile time.

use static_assertions::const_assert_eq;

use crate::messages::{ClientMessage, ServerMessage};

// ---------------------------------------------------------------------------
// ClientOpcode
// ---------------------------------------------------------------------------

/// Opcode tagging each client → server request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClientOpcode {
    /// [`CreatePartyRequest`](crate::messages::CreatePartyRequest).
    CreateParty = 0,
    /// [`InviteRequest`](crate::messages::InviteRequest).
    Invite = 1,
    /// [`AcceptInviteRequest`](crate::messages::AcceptInviteRequest).
    AcceptInvite = 2,
    /// [`LeavePartyRequest`](crate::messages::LeavePartyRequest).
    LeaveParty = 3,
    /// [`ChangeLeaderRequest`](crate::messages::ChangeLeaderRequest).
    ChangeLeader = 4,
    /// [`KickRequest`](crate::messages::KickRequest).
    Kick = 5,
}

impl ClientOpcode {
    /// Decode a wire byte into an opcode. `None` for unknown ordinals.
    pub fn from_wire(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::CreateParty,
            1 => Self::Invite,
            2 => Self::AcceptInvite,
            3 => Self::LeaveParty,
            4 => Self::ChangeLeader,
            5 => Self::Kick,
            _ => return None,
        })
    }
}

impl ClientMessage {
    /// Extract the wire opcode from a request without consuming it.
    pub fn opcode(&self) -> ClientOpcode {
        match self {
            ClientMessage::CreateParty(_) => ClientOpcode::CreateParty,
            ClientMessage::Invite(_) => ClientOpcode::Invite,
            ClientMessage::AcceptInvite(_) => ClientOpcode::AcceptInvite,
            ClientMessage::LeaveParty(_) => ClientOpcode::LeaveParty,
            ClientMessage::ChangeLeader(_) => ClientOpcode::ChangeLeader,
            ClientMessage::Kick(_) => ClientOpcode::Kick,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerOpcode
// ---------------------------------------------------------------------------

/// Opcode tagging each server → client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServerOpcode {
    /// [`PresenceList`](crate::messages::PresenceList).
    PresenceList = 0,
    /// [`PartyInfo`](crate::messages::PartyInfo).
    PartyInfo = 1,
    /// [`PartyInvite`](crate::messages::PartyInvite).
    PartyInvite = 2,
    /// [`PartyJoined`](crate::messages::PartyJoined).
    PartyJoined = 3,
    /// [`PartyLeft`](crate::messages::PartyLeft).
    PartyLeft = 4,
    /// [`PlayerJoinedNotice`](crate::messages::PlayerJoinedNotice).
    PlayerJoinedNotice = 5,
    /// [`TimeSettings`](crate::messages::TimeSettings).
    TimeSettings = 6,
}

impl ServerOpcode {
    /// Decode a wire byte into an opcode. `None` for unknown ordinals.
    pub fn from_wire(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::PresenceList,
            1 => Self::PartyInfo,
            2 => Self::PartyInvite,
            3 => Self::PartyJoined,
            4 => Self::PartyLeft,
            5 => Self::PlayerJoinedNotice,
            6 => Self::TimeSettings,
            _ => return None,
        })
    }
}

impl ServerMessage {
    /// Extract the wire opcode from a message without consuming it.
    pub fn opcode(&self) -> ServerOpcode {
        match self {
            ServerMessage::PresenceList(_) => ServerOpcode::PresenceList,
            ServerMessage::PartyInfo(_) => ServerOpcode::PartyInfo,
            ServerMessage::PartyInvite(_) => ServerOpcode::PartyInvite,
            ServerMessage::PartyJoined(_) => ServerOpcode::PartyJoined,
            ServerMessage::PartyLeft(_) => ServerOpcode::PartyLeft,
            ServerMessage::PlayerJoinedNotice(_) => ServerOpcode::PlayerJoinedNotice,
            ServerMessage::TimeSettings(_) => ServerOpcode::TimeSettings,
        }
    }
}

// ---------------------------------------------------------------------------
// Shipped ordinals, pinned
// ---------------------------------------------------------------------------

const_assert_eq!(ClientOpcode::CreateParty as u8, 0);
const_assert_eq!(ClientOpcode::Invite as u8, 1);
const_assert_eq!(ClientOpcode::AcceptInvite as u8, 2);
const_assert_eq!(ClientOpcode::LeaveParty as u8, 3);
const_assert_eq!(ClientOpcode::ChangeLeader as u8, 4);
const_assert_eq!(ClientOpcode::Kick as u8, 5);

const_assert_eq!(ServerOpcode::PresenceList as u8, 0);
const_assert_eq!(ServerOpcode::PartyInfo as u8, 1);
const_assert_eq!(ServerOpcode::PartyInvite as u8, 2);
const_assert_eq!(ServerOpcode::PartyJoined as u8, 3);
const_assert_eq!(ServerOpcode::PartyLeft as u8, 4);
const_assert_eq!(ServerOpcode::PlayerJoinedNotice as u8, 5);
const_assert_eq!(ServerOpcode::TimeSettings as u8, 6);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
