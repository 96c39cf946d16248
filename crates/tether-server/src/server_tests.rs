//! End-to-end tests: events in, state and outbound messages out.

use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::Receiver;

use tether_config::Config;
use tether_party::INVITE_EXPIRY_TICKS;
use tether_protocol::{
    AcceptInviteRequest, ClientMessage, CreatePartyRequest, InviteRequest, KickRequest,
    LeavePartyRequest, PartyId, ServerMessage,
};
use tether_world::{
    EntitySpawned, FormKind, LOCAL_PLAYER_REF, NoopObjectModel, ObjectModel, RefId,
    ReferenceActivated, ReferenceDeactivated,
};

use super::*;
use crate::outbound::{OutboundMessage, outbound_channel};
use crate::players::Player;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config() -> Config {
    let mut config = Config::default();
    config.server.max_players = 4;
    config
}

fn server() -> (SyncServer, Receiver<OutboundMessage>) {
    let (outbound, outbox) = outbound_channel();
    let server = SyncServer::new(&test_config(), outbound, Box::new(NoopObjectModel));
    (server, outbox)
}

fn player(id: u64, name: &str) -> Player {
    Player {
        id,
        name: name.to_string(),
        level: 12,
    }
}

/// Drains the outbound queue into (recipient, message) pairs.
fn drain(outbox: &Receiver<OutboundMessage>) -> Vec<OutboundMessage> {
    outbox.try_iter().collect()
}

fn messages_for(queued: &[OutboundMessage], id: u64) -> Vec<ServerMessage> {
    queued
        .iter()
        .filter(|(to, _)| *to == id)
        .map(|(_, msg)| msg.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Session flow
// ---------------------------------------------------------------------------

#[test]
fn test_connect_announces_and_sends_time_settings() {
    let (server, outbox) = server();

    server.connect_player(player(1, "Alice"), 0x3C, 0x9A12).unwrap();
    server.connect_player(player(2, "Bob"), 0x3C, 0x9A12).unwrap();

    let queued = drain(&outbox);

    // Bob got the world clock on connect.
    let bob = messages_for(&queued, 2);
    assert!(
        bob.iter()
            .any(|m| matches!(m, ServerMessage::TimeSettings(_))),
        "joining player must receive time settings"
    );

    // Alice learned about Bob: presence refresh plus the join notice.
    let alice = messages_for(&queued, 1);
    assert!(alice.iter().any(|m| matches!(
        m,
        ServerMessage::PresenceList(list) if list.players.contains_key(&2)
    )));
    assert!(alice.iter().any(|m| matches!(
        m,
        ServerMessage::PlayerJoinedNotice(n) if n.player_id == 2 && n.display_name == "Bob"
    )));
}

#[test]
fn test_admission_cap_is_enforced() {
    let (server, _outbox) = server();

    for id in 1..=4 {
        server.connect_player(player(id, "p"), 0, 0).unwrap();
    }
    let result = server.connect_player(player(5, "q"), 0, 0);
    assert_eq!(result, Err(JoinError::ServerFull(4)));
    assert_eq!(server.players().len(), 4);
}

#[test]
fn test_disconnect_refreshes_presence_without_the_leaver() {
    let (server, outbox) = server();
    server.connect_player(player(1, "Alice"), 0, 0).unwrap();
    server.connect_player(player(2, "Bob"), 0, 0).unwrap();
    drain(&outbox);

    server.disconnect_player(2);

    let queued = drain(&outbox);
    assert!(messages_for(&queued, 2).is_empty(), "leaver gets nothing");
    let alice = messages_for(&queued, 1);
    assert!(alice.iter().any(|m| matches!(
        m,
        ServerMessage::PresenceList(list) if !list.players.contains_key(&2)
    )));
    assert!(server.players().get(2).is_none());
}

// ---------------------------------------------------------------------------
// Party flow through the bus
// ---------------------------------------------------------------------------

#[test]
fn test_party_lifecycle_through_requests() {
    let (server, outbox) = server();
    server.connect_player(player(1, "Alice"), 0, 0).unwrap();
    server.connect_player(player(2, "Bob"), 0, 0).unwrap();
    drain(&outbox);

    // Alice creates a party.
    server.handle_client_message(1, ClientMessage::CreateParty(CreatePartyRequest {}));
    assert_eq!(
        server.coordinator().player_party(1).unwrap().id,
        PartyId(1)
    );

    // A few ticks pass, then Alice invites Bob.
    for _ in 0..10 {
        server.advance_tick();
    }
    drain(&outbox);
    server.handle_client_message(
        1,
        ClientMessage::Invite(InviteRequest {
            target_player_id: 2,
        }),
    );

    let queued = drain(&outbox);
    let invite = messages_for(&queued, 2)
        .into_iter()
        .find_map(|m| match m {
            ServerMessage::PartyInvite(invite) => Some(invite),
            _ => None,
        })
        .expect("Bob must receive the invite");
    assert_eq!(invite.inviter_party_id, PartyId(1));
    assert_eq!(invite.expiry_tick, server.current_tick() + INVITE_EXPIRY_TICKS);

    // Bob accepts; both get the updated roster.
    server.handle_client_message(2, ClientMessage::AcceptInvite(AcceptInviteRequest { inviter_id: 1 }));
    let queued = drain(&outbox);
    for id in [1, 2] {
        assert!(
            messages_for(&queued, id)
                .iter()
                .any(|m| matches!(m, ServerMessage::PartyInfo(info) if info.member_player_ids == vec![1, 2])),
            "player {id} must see the two-member roster"
        );
    }

    // Alice leaves; Bob inherits leadership.
    server.handle_client_message(1, ClientMessage::LeaveParty(LeavePartyRequest {}));
    let queued = drain(&outbox);
    assert!(messages_for(&queued, 1)
        .iter()
        .any(|m| matches!(m, ServerMessage::PartyLeft(_))));
    let coordinator = server.coordinator();
    let party = coordinator.get_by_id(PartyId(1)).unwrap();
    assert_eq!(party.leader, 2);
    assert_eq!(party.members, vec![2]);
}

#[test]
fn test_rejected_request_stays_off_the_wire() {
    let (server, outbox) = server();
    server.connect_player(player(1, "Alice"), 0, 0).unwrap();
    server.connect_player(player(2, "Bob"), 0, 0).unwrap();
    drain(&outbox);

    // Bob leads nothing; his kick must change nothing and send nothing.
    server.handle_client_message(
        2,
        ClientMessage::Kick(KickRequest {
            target_player_id: 1,
        }),
    );
    assert!(drain(&outbox).is_empty());
    assert!(server.coordinator().player_party(1).is_none());
}

#[test]
fn test_disconnect_leaves_party_behind() {
    let (server, outbox) = server();
    server.connect_player(player(1, "Alice"), 0, 0).unwrap();
    server.connect_player(player(2, "Bob"), 0, 0).unwrap();
    server.handle_client_message(1, ClientMessage::CreateParty(CreatePartyRequest {}));
    server.handle_client_message(2, ClientMessage::AcceptInvite(AcceptInviteRequest { inviter_id: 1 }));
    drain(&outbox);

    server.disconnect_player(1);

    let coordinator = server.coordinator();
    let party = coordinator.get_by_id(PartyId(1)).unwrap();
    assert_eq!(party.members, vec![2]);
    assert_eq!(party.leader, 2);
}

// ---------------------------------------------------------------------------
// Entity flow through the bus
// ---------------------------------------------------------------------------

#[test]
fn test_activation_maps_reference_and_emits_spawn() {
    let (server, _outbox) = server();

    let spawned: Rc<RefCell<Vec<EntitySpawned>>> = Rc::new(RefCell::new(Vec::new()));
    let _sub = server.bus().subscribe({
        let spawned = Rc::clone(&spawned);
        move |ev: &EntitySpawned| spawned.borrow_mut().push(*ev)
    });

    server.bus().publish(&ReferenceActivated {
        ref_id: RefId(0x2000),
        kind: FormKind::Character,
    });

    let events = spawned.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].ref_id, RefId(0x2000));
    assert_eq!(
        server.directory().lookup(RefId(0x2000)),
        Some(events[0].handle)
    );
    assert_eq!(server.store().len(), 1);
}

#[test]
fn test_deactivation_clears_mapping_and_entity() {
    let (server, _outbox) = server();

    server.bus().publish(&ReferenceActivated {
        ref_id: RefId(0x2000),
        kind: FormKind::Character,
    });
    server.bus().publish(&ReferenceDeactivated {
        ref_id: RefId(0x2000),
    });

    assert_eq!(server.directory().lookup(RefId(0x2000)), None);
    assert!(server.store().is_empty());
}

#[test]
fn test_local_player_activation_flags_authority() {
    /// Records capability calls through shared state, since the server owns
    /// the model box.
    struct SharedModel(Rc<RefCell<Vec<RefId>>>);

    impl ObjectModel for SharedModel {
        fn flag_local_authority(&mut self, ref_id: RefId) {
            self.0.borrow_mut().push(ref_id);
        }
        fn flag_remote_authority(&mut self, _ref_id: RefId) {}
    }

    let flagged = Rc::new(RefCell::new(Vec::new()));
    let (outbound, _outbox) = outbound_channel();
    let server = SyncServer::new(
        &test_config(),
        outbound,
        Box::new(SharedModel(Rc::clone(&flagged))),
    );

    server.bus().publish(&ReferenceActivated {
        ref_id: LOCAL_PLAYER_REF,
        kind: FormKind::Character,
    });

    assert_eq!(*flagged.borrow(), vec![LOCAL_PLAYER_REF]);
}

// ---------------------------------------------------------------------------
// Ticks
// ---------------------------------------------------------------------------

#[test]
fn test_ticks_advance_the_clock() {
    let (server, _outbox) = server();
    assert_eq!(server.current_tick(), 0);

    server.advance_tick();
    server.advance_tick();
    assert_eq!(server.current_tick(), 2);
}
