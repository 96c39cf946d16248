//! Message payload types and serialization.
//!
//! Every message is encoded as `[version: u8] [opcode: u8] [postcard payload]`.
//! The opcode byte, not the payload, identifies the message type on the wire,
//! so payload structs can gain fields without renumbering anything. Use
//! [`encode_server_message`] / [`decode_server_message`] and the client-side
//! counterparts for encoding/decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::opcodes::{ClientOpcode, ServerOpcode};
use crate::{PlayerId, Tick};

/// Current wire-protocol version. Prepended to every serialized message.
pub const PROTOCOL_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// PartyId
// ---------------------------------------------------------------------------

/// Identifier of a party. Allocated by the server from a monotonically
/// increasing counter and never reused for the lifetime of the process.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartyId(pub u32);

// ---------------------------------------------------------------------------
// Client → server requests
// ---------------------------------------------------------------------------

/// Top-level client request. The wire opcode is derived via
/// [`ClientMessage::opcode`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClientMessage {
    /// Create a new party with the sender as sole member and leader.
    CreateParty(CreatePartyRequest),
    /// Invite another player into the sender's party.
    Invite(InviteRequest),
    /// Accept an invitation into another player's party.
    AcceptInvite(AcceptInviteRequest),
    /// Leave the sender's current party.
    LeaveParty(LeavePartyRequest),
    /// Hand party leadership to another member.
    ChangeLeader(ChangeLeaderRequest),
    /// Remove a player from the sender's party.
    Kick(KickRequest),
}

/// Request to create a party. Carries no fields; the sender is implied by
/// the connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreatePartyRequest {}

/// Request to invite `target_player_id` into the sender's party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InviteRequest {
    /// The player being invited.
    pub target_player_id: PlayerId,
}

/// Request to accept an earlier invitation from `inviter_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcceptInviteRequest {
    /// The player whose party the sender wants to join.
    pub inviter_id: PlayerId,
}

/// Request to leave the sender's current party. Carries no fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LeavePartyRequest {}

/// Request to transfer leadership to `target_player_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeLeaderRequest {
    /// The member who should become leader.
    pub target_player_id: PlayerId,
}

/// Request to kick `target_player_id` out of the sender's party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KickRequest {
    /// The player being kicked.
    pub target_player_id: PlayerId,
}

// ---------------------------------------------------------------------------
// Server → client messages
// ---------------------------------------------------------------------------

/// Top-level server message. The wire opcode is derived via
/// [`ServerMessage::opcode`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ServerMessage {
    /// The set of other connected players, for presence UI.
    PresenceList(PresenceList),
    /// Updated party roster, sent to every current member.
    PartyInfo(PartyInfo),
    /// An invitation into a party.
    PartyInvite(PartyInvite),
    /// Confirmation that the recipient joined a party.
    PartyJoined(PartyJoined),
    /// Confirmation that the recipient left their party.
    PartyLeft(PartyLeft),
    /// Announcement of a newly connected player.
    PlayerJoinedNotice(PlayerJoinedNotice),
    /// Shared world-clock settings.
    TimeSettings(TimeSettings),
}

/// Presence snapshot: every other connected player's display name, keyed by
/// player id. The recipient itself is never included.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PresenceList {
    /// Connected players visible to the recipient.
    pub players: BTreeMap<PlayerId, String>,
}

/// Current party roster, sent to each member with a per-recipient leader flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartyInfo {
    /// The current leader.
    pub leader_player_id: PlayerId,
    /// All members in join order.
    pub member_player_ids: Vec<PlayerId>,
    /// Whether the recipient is the leader.
    pub is_leader: bool,
}

/// Invitation into a party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartyInvite {
    /// The inviting party.
    pub inviter_party_id: PartyId,
    /// Server tick at which the invitation lapses.
    pub expiry_tick: Tick,
}

/// Sent to a player when they enter a party (on create or accept).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartyJoined {
    /// The current leader.
    pub leader_player_id: PlayerId,
    /// Whether the recipient is the leader.
    pub is_leader: bool,
    /// All members in join order, the recipient included.
    pub member_player_ids: Vec<PlayerId>,
}

/// Sent to a player when they leave (or are removed from) their party.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartyLeft {}

/// Announcement of a newly connected player, sent to everyone else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerJoinedNotice {
    /// The new player's id.
    pub player_id: PlayerId,
    /// The new player's display name.
    pub display_name: String,
    /// World space the player spawned into.
    pub world_space_id: u32,
    /// Cell the player spawned into.
    pub cell_id: u32,
    /// The new player's level.
    pub level: u16,
}

/// Shared world-clock settings, sent to each player on connect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSettings {
    /// In-game seconds per real second.
    pub time_scale: f32,
    /// Current in-game hour (fractional, 0.0–24.0).
    pub hour: f32,
    /// Current in-game day of month.
    pub day: u16,
    /// Current in-game month.
    pub month: u16,
    /// Current in-game year.
    pub year: u16,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during message deserialization.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The payload was shorter than the two-byte header.
    #[error("truncated payload — missing version or opcode byte")]
    Truncated,

    /// The version byte does not match [`PROTOCOL_VERSION`].
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The opcode byte does not name a known message.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(u8),

    /// Postcard deserialization failed.
    #[error("deserialization error: {0}")]
    Postcard(#[from] postcard::Error),
}

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

fn encode(opcode: u8, payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + payload.len());
    out.push(PROTOCOL_VERSION);
    out.push(opcode);
    out.extend_from_slice(&payload);
    out
}

fn split_header(data: &[u8]) -> Result<(u8, &[u8]), MessageError> {
    let [version, opcode, body @ ..] = data else {
        return Err(MessageError::Truncated);
    };
    if *version != PROTOCOL_VERSION {
        return Err(MessageError::UnsupportedVersion(*version));
    }
    Ok((*opcode, body))
}

/// Serialize a [`ServerMessage`] into a versioned, opcode-tagged payload.
pub fn encode_server_message(msg: &ServerMessage) -> Result<Vec<u8>, postcard::Error> {
    let payload = match msg {
        ServerMessage::PresenceList(m) => postcard::to_allocvec(m)?,
        ServerMessage::PartyInfo(m) => postcard::to_allocvec(m)?,
        ServerMessage::PartyInvite(m) => postcard::to_allocvec(m)?,
        ServerMessage::PartyJoined(m) => postcard::to_allocvec(m)?,
        ServerMessage::PartyLeft(m) => postcard::to_allocvec(m)?,
        ServerMessage::PlayerJoinedNotice(m) => postcard::to_allocvec(m)?,
        ServerMessage::TimeSettings(m) => postcard::to_allocvec(m)?,
    };
    Ok(encode(msg.opcode() as u8, payload))
}

/// Deserialize a versioned payload into a [`ServerMessage`].
pub fn decode_server_message(data: &[u8]) -> Result<ServerMessage, MessageError> {
    let (opcode, body) = split_header(data)?;
    let opcode = ServerOpcode::from_wire(opcode).ok_or(MessageError::UnknownOpcode(opcode))?;
    let msg = match opcode {
        ServerOpcode::PresenceList => ServerMessage::PresenceList(postcard::from_bytes(body)?),
        ServerOpcode::PartyInfo => ServerMessage::PartyInfo(postcard::from_bytes(body)?),
        ServerOpcode::PartyInvite => ServerMessage::PartyInvite(postcard::from_bytes(body)?),
        ServerOpcode::PartyJoined => ServerMessage::PartyJoined(postcard::from_bytes(body)?),
        ServerOpcode::PartyLeft => ServerMessage::PartyLeft(postcard::from_bytes(body)?),
        ServerOpcode::PlayerJoinedNotice => {
            ServerMessage::PlayerJoinedNotice(postcard::from_bytes(body)?)
        }
        ServerOpcode::TimeSettings => ServerMessage::TimeSettings(postcard::from_bytes(body)?),
    };
    Ok(msg)
}

/// Serialize a [`ClientMessage`] into a versioned, opcode-tagged payload.
pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>, postcard::Error> {
    let payload = match msg {
        ClientMessage::CreateParty(m) => postcard::to_allocvec(m)?,
        ClientMessage::Invite(m) => postcard::to_allocvec(m)?,
        ClientMessage::AcceptInvite(m) => postcard::to_allocvec(m)?,
        ClientMessage::LeaveParty(m) => postcard::to_allocvec(m)?,
        ClientMessage::ChangeLeader(m) => postcard::to_allocvec(m)?,
        ClientMessage::Kick(m) => postcard::to_allocvec(m)?,
    };
    Ok(encode(msg.opcode() as u8, payload))
}

/// Deserialize a versioned payload into a [`ClientMessage`].
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage, MessageError> {
    let (opcode, body) = split_header(data)?;
    let opcode = ClientOpcode::from_wire(opcode).ok_or(MessageError::UnknownOpcode(opcode))?;
    let msg = match opcode {
        ClientOpcode::CreateParty => ClientMessage::CreateParty(postcard::from_bytes(body)?),
        ClientOpcode::Invite => ClientMessage::Invite(postcard::from_bytes(body)?),
        ClientOpcode::AcceptInvite => ClientMessage::AcceptInvite(postcard::from_bytes(body)?),
        ClientOpcode::LeaveParty => ClientMessage::LeaveParty(postcard::from_bytes(body)?),
        ClientOpcode::ChangeLeader => ClientMessage::ChangeLeader(postcard::from_bytes(body)?),
        ClientOpcode::Kick => ClientMessage::Kick(postcard::from_bytes(body)?),
    };
    Ok(msg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
