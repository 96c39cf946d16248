//! Wire protocol: typed client/server messages, stable opcodes, and
//! versioned serialization.

pub mod messages;
pub mod opcodes;

pub use messages::{
    AcceptInviteRequest, ChangeLeaderRequest, ClientMessage, CreatePartyRequest, InviteRequest,
    KickRequest, LeavePartyRequest, MessageError, PROTOCOL_VERSION, PartyId, PartyInfo,
    PartyInvite, PartyJoined, PartyLeft, PlayerJoinedNotice, PresenceList, ServerMessage,
    TimeSettings, decode_client_message, decode_server_message, encode_client_message,
    encode_server_message,
};
pub use opcodes::{ClientOpcode, ServerOpcode};

/// Stable identifier of a connected player, assigned outside this core.
pub type PlayerId = u64;

/// Discrete server time unit, monotonically increasing.
pub type Tick = u64;
