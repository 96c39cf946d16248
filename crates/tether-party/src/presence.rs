//! Presence: who-is-online lists and join announcements.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use tether_protocol::{PlayerId, PlayerJoinedNotice, PresenceList, ServerMessage};

use crate::{Outbound, Roster};

/// Sends every connected player (except `ignored`) the set of all *other*
/// connected players' display names. The recipient and the ignored player
/// are excluded from each list.
pub fn broadcast_presence(roster: &dyn Roster, out: &dyn Outbound, ignored: Option<PlayerId>) {
    let connected = roster.connected();
    for &recipient in &connected {
        if Some(recipient) == ignored {
            continue;
        }

        let mut players = BTreeMap::new();
        for &other in &connected {
            if other == recipient || Some(other) == ignored {
                continue;
            }
            if let Some(profile) = roster.profile(other) {
                players.insert(other, profile.name);
            }
        }

        out.send(
            recipient,
            ServerMessage::PresenceList(PresenceList { players }),
        );
    }
}

/// Sends `msg` to every connected player except `except`.
pub fn broadcast_except(
    roster: &dyn Roster,
    out: &dyn Outbound,
    msg: ServerMessage,
    except: Option<PlayerId>,
) {
    for recipient in roster.connected() {
        if Some(recipient) == except {
            continue;
        }
        out.send(recipient, msg.clone());
    }
}

/// Player connected: refresh everyone's presence list, then announce the
/// newcomer to everyone else.
pub fn announce_player(
    roster: &dyn Roster,
    out: &dyn Outbound,
    player_id: PlayerId,
    world_space_id: u32,
    cell_id: u32,
) {
    let Some(profile) = roster.profile(player_id) else {
        warn!("cannot announce unknown player {player_id}");
        return;
    };

    broadcast_presence(roster, out, None);

    debug!("announcing player {player_id} ({})", profile.name);
    broadcast_except(
        roster,
        out,
        ServerMessage::PlayerJoinedNotice(PlayerJoinedNotice {
            player_id,
            display_name: profile.name,
            world_space_id,
            cell_id,
            level: profile.level,
        }),
        Some(player_id),
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
