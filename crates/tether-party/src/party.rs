//! The party record and the rejection codes shared by party operations.

use rustc_hash::FxHashMap;

use tether_protocol::{PartyId, PlayerId, Tick};

// ---------------------------------------------------------------------------
// Party
// ---------------------------------------------------------------------------

/// One active party. Exists in the coordinator's table only while it has at
/// least one member; the leader is always a current member.
#[derive(Debug, Clone)]
pub struct Party {
    /// The party's id.
    pub id: PartyId,
    /// The current leader. Always an element of `members`.
    pub leader: PlayerId,
    /// Members in join order. Join order decides leader succession.
    pub members: Vec<PlayerId>,
    /// Pending invitations: invitee → expiry tick.
    pub invitations: FxHashMap<PlayerId, Tick>,
}

impl Party {
    pub(crate) fn new(id: PartyId, leader: PlayerId) -> Self {
        Self {
            id,
            leader,
            members: vec![leader],
            invitations: FxHashMap::default(),
        }
    }

    /// Whether `player` is a current member.
    pub fn is_member(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }

    /// The expiry tick of a pending invitation for `invitee`, if any.
    pub fn pending_invitation(&self, invitee: PlayerId) -> Option<Tick> {
        self.invitations.get(&invitee).copied()
    }
}

// ---------------------------------------------------------------------------
// PartyError
// ---------------------------------------------------------------------------

/// Why a party operation was rejected. Rejections are network-silent — no
/// state change, no outbound message — but surfaced to callers for logging
/// and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyError {
    /// The named player is not connected.
    UnknownPlayer(PlayerId),
    /// The operation targets its own sender.
    SelfTarget,
    /// The acting or target player already belongs to a party.
    AlreadyInParty,
    /// The acting (or, for accept, inviting) player belongs to no party.
    NotInParty,
    /// The invitee already belongs to a party.
    TargetInParty,
    /// The acting player is not their party's leader.
    NotLeader,
    /// The leadership candidate is not a member of the party.
    NotAMember,
}
