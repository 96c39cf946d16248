//! The party coordinator: owns the party table and player associations.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use tether_protocol::{
    PartyId, PartyInfo, PartyInvite, PartyJoined, PartyLeft, PlayerId, ServerMessage, Tick,
};

use crate::party::{Party, PartyError};
use crate::presence::broadcast_presence;
use crate::{INVITE_EXPIRY_TICKS, INVITE_SWEEP_INTERVAL_TICKS, Outbound, Roster};

/// Owns every active [`Party`] and the player → party association. All
/// mutation goes through the operations below; each runs to completion on
/// the single server execution context.
#[derive(Debug, Default)]
pub struct PartyCoordinator {
    parties: FxHashMap<PartyId, Party>,
    memberships: FxHashMap<PlayerId, PartyId>,
    next_party_id: u32,
    next_invite_sweep: Tick,
}

impl PartyCoordinator {
    /// Creates an empty coordinator. The first allocated party id is 1.
    pub fn new() -> Self {
        Self {
            next_party_id: 1,
            ..Self::default()
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Looks up a party by id.
    pub fn get_by_id(&self, id: PartyId) -> Option<&Party> {
        self.parties.get(&id)
    }

    /// Looks up the party a player belongs to, if any.
    pub fn player_party(&self, player: PlayerId) -> Option<&Party> {
        self.parties.get(self.memberships.get(&player)?)
    }

    /// Iterates over all active parties.
    pub fn parties(&self) -> impl Iterator<Item = &Party> {
        self.parties.values()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Creates a new party with `candidate` as sole member and leader, and
    /// sends them the join notice.
    pub fn create_party(
        &mut self,
        roster: &dyn Roster,
        out: &dyn Outbound,
        candidate: PlayerId,
    ) -> Result<PartyId, PartyError> {
        if !roster.contains(candidate) {
            return reject("create", PartyError::UnknownPlayer(candidate));
        }
        if self.memberships.contains_key(&candidate) {
            return reject("create", PartyError::AlreadyInParty);
        }

        let id = PartyId(self.next_party_id);
        self.next_party_id += 1;

        let party = Party::new(id, candidate);
        send_party_joined(out, &party, candidate);
        self.parties.insert(id, party);
        self.memberships.insert(candidate, id);

        debug!("created party {id:?} for player {candidate}");
        Ok(id)
    }

    /// Invites `invitee` into `inviter`'s party, recording a pending
    /// invitation that lapses [`INVITE_EXPIRY_TICKS`] after `now`.
    pub fn invite(
        &mut self,
        roster: &dyn Roster,
        out: &dyn Outbound,
        inviter: PlayerId,
        invitee: PlayerId,
        now: Tick,
    ) -> Result<(), PartyError> {
        if !roster.contains(invitee) {
            return reject("invite", PartyError::UnknownPlayer(invitee));
        }
        if invitee == inviter {
            return reject("invite", PartyError::SelfTarget);
        }
        let Some(&party_id) = self.memberships.get(&inviter) else {
            return reject("invite", PartyError::NotInParty);
        };
        if self.memberships.contains_key(&invitee) {
            return reject("invite", PartyError::TargetInParty);
        }
        let Some(party) = self.parties.get_mut(&party_id) else {
            return reject("invite", PartyError::NotInParty);
        };
        if party.leader != inviter {
            return reject("invite", PartyError::NotLeader);
        }

        let expiry_tick = now + INVITE_EXPIRY_TICKS;
        party.invitations.insert(invitee, expiry_tick);
        out.send(
            invitee,
            ServerMessage::PartyInvite(PartyInvite {
                inviter_party_id: party_id,
                expiry_tick,
            }),
        );

        debug!("player {inviter} invited {invitee} into party {party_id:?}");
        Ok(())
    }

    /// Adds `accepter` to `inviter`'s party.
    ///
    /// Acceptance is validated against player state only — whether a pending
    /// invitation exists, or has expired, is deliberately never consulted
    /// (the invitation table is bookkeeping, see [`Self::sweep_invitations`]).
    pub fn accept_invite(
        &mut self,
        roster: &dyn Roster,
        out: &dyn Outbound,
        accepter: PlayerId,
        inviter: PlayerId,
    ) -> Result<PartyId, PartyError> {
        if !roster.contains(inviter) {
            return reject("accept", PartyError::UnknownPlayer(inviter));
        }
        if inviter == accepter {
            return reject("accept", PartyError::SelfTarget);
        }
        let Some(&party_id) = self.memberships.get(&inviter) else {
            return reject("accept", PartyError::NotInParty);
        };
        if self.memberships.contains_key(&accepter) {
            return reject("accept", PartyError::AlreadyInParty);
        }

        // Joining a party cancels every invitation still addressed to the
        // joiner, wherever it came from.
        for party in self.parties.values_mut() {
            party.invitations.remove(&accepter);
        }

        let Some(party) = self.parties.get_mut(&party_id) else {
            return reject("accept", PartyError::NotInParty);
        };
        party.members.push(accepter);
        self.memberships.insert(accepter, party_id);
        send_party_joined(out, party, accepter);

        self.broadcast_party_info(out, party_id);

        debug!("player {accepter} joined party {party_id:?}");
        Ok(party_id)
    }

    /// Removes `player` from their party. The last member leaving dissolves
    /// the party; a leaving leader hands leadership to the earliest-joined
    /// remaining member. The leaver always receives the left notice.
    pub fn leave(&mut self, out: &dyn Outbound, player: PlayerId) -> Result<PartyId, PartyError> {
        let Some(party_id) = self.memberships.remove(&player) else {
            trace!("player {player} left no party (not a member)");
            return Err(PartyError::NotInParty);
        };

        let Some(party) = self.parties.get_mut(&party_id) else {
            return Err(PartyError::NotInParty);
        };
        party.members.retain(|&m| m != player);

        if party.members.is_empty() {
            self.parties.remove(&party_id);
            debug!("party {party_id:?} dissolved");
        } else {
            if party.leader == player {
                // Succession: earliest remaining join order. The inviter
                // lost leadership, so pending invitations lapse with it.
                party.leader = party.members[0];
                party.invitations.clear();
                debug!(
                    "leader left, reassigned party {party_id:?} leader to {}",
                    party.leader
                );
            }
            self.broadcast_party_info(out, party_id);
        }

        out.send(player, ServerMessage::PartyLeft(PartyLeft {}));
        Ok(party_id)
    }

    /// Transfers leadership of `requester`'s party to `candidate`.
    pub fn change_leader(
        &mut self,
        roster: &dyn Roster,
        out: &dyn Outbound,
        requester: PlayerId,
        candidate: PlayerId,
    ) -> Result<(), PartyError> {
        if !roster.contains(candidate) {
            return reject("change-leader", PartyError::UnknownPlayer(candidate));
        }
        let Some(&party_id) = self.memberships.get(&requester) else {
            return reject("change-leader", PartyError::NotInParty);
        };
        let Some(party) = self.parties.get_mut(&party_id) else {
            return reject("change-leader", PartyError::NotInParty);
        };
        if party.leader != requester {
            return reject("change-leader", PartyError::NotLeader);
        }
        if !party.is_member(candidate) {
            return reject("change-leader", PartyError::NotAMember);
        }

        party.leader = candidate;
        party.invitations.clear();
        self.broadcast_party_info(out, party_id);

        debug!("party {party_id:?} leader changed to {candidate}");
        Ok(())
    }

    /// Removes `target` from their party on the authority of `requester`,
    /// who must lead a party, then broadcasts presence with the kicked
    /// player as the ignore-target.
    ///
    /// The removal path is exactly [`Self::leave`] applied to the target:
    /// the target leaves whichever party they belong to.
    pub fn kick(
        &mut self,
        roster: &dyn Roster,
        out: &dyn Outbound,
        requester: PlayerId,
        target: PlayerId,
    ) -> Result<(), PartyError> {
        if !roster.contains(target) {
            return reject("kick", PartyError::UnknownPlayer(target));
        }
        let Some(&party_id) = self.memberships.get(&requester) else {
            return reject("kick", PartyError::NotInParty);
        };
        let Some(party) = self.parties.get(&party_id) else {
            return reject("kick", PartyError::NotInParty);
        };
        if party.leader != requester {
            return reject("kick", PartyError::NotLeader);
        }

        debug!("kicking player {target} on behalf of {requester}");
        // Idempotent like any removal: a party-less target just triggers the
        // presence broadcast.
        let _ = self.leave(out, target);
        broadcast_presence(roster, out, Some(target));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Session hooks
    // -----------------------------------------------------------------------

    /// Player disconnected: run the leave path, then refresh everyone's
    /// presence list with the leaver as the ignore-target.
    pub fn on_player_left(&mut self, roster: &dyn Roster, out: &dyn Outbound, player: PlayerId) {
        let _ = self.leave(out, player);
        broadcast_presence(roster, out, Some(player));
    }

    /// Tick-driven invitation sweep. Runs at most once per
    /// [`INVITE_SWEEP_INTERVAL_TICKS`] and purges invitation records whose
    /// expiry has passed. Purging is bookkeeping only: no notice is sent,
    /// and [`Self::accept_invite`] never consults these records.
    pub fn sweep_invitations(&mut self, now: Tick) {
        if now < self.next_invite_sweep {
            return;
        }
        self.next_invite_sweep = now + INVITE_SWEEP_INTERVAL_TICKS;

        let mut purged = 0usize;
        for party in self.parties.values_mut() {
            let before = party.invitations.len();
            party.invitations.retain(|_, &mut expiry| expiry > now);
            purged += before - party.invitations.len();
        }
        if purged > 0 {
            debug!("purged {purged} expired party invitations");
        }
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// Sends the current roster to every member, with a per-recipient
    /// leader flag.
    fn broadcast_party_info(&self, out: &dyn Outbound, party_id: PartyId) {
        let Some(party) = self.parties.get(&party_id) else {
            return;
        };
        for &member in &party.members {
            out.send(
                member,
                ServerMessage::PartyInfo(PartyInfo {
                    leader_player_id: party.leader,
                    member_player_ids: party.members.clone(),
                    is_leader: member == party.leader,
                }),
            );
        }
    }
}

/// Sends the join notice for `party` to `player`.
fn send_party_joined(out: &dyn Outbound, party: &Party, player: PlayerId) {
    out.send(
        player,
        ServerMessage::PartyJoined(PartyJoined {
            leader_player_id: party.leader,
            is_leader: party.leader == player,
            member_player_ids: party.members.clone(),
        }),
    );
}

/// Logs and returns a silent rejection.
fn reject<T>(operation: &str, error: PartyError) -> Result<T, PartyError> {
    debug!("party {operation} rejected: {error:?}");
    Err(error)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "coordinator_tests.rs"]
pub(crate) mod tests;
